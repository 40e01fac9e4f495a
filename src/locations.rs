//! Location authority
//! Static province/district table and jurisdiction validation

use once_cell::sync::Lazy;

/// Province -> districts table. Head Office has no districts.
/// Loaded once at startup and treated as immutable configuration.
static PROVINCE_DISTRICTS: Lazy<Vec<(&'static str, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        ("Head Office", vec![]),
        ("Bulawayo", vec!["Bulawayo District"]),
        ("Harare", vec!["Harare District"]),
        (
            "Manicaland",
            vec!["Buhera", "Chimanimani", "Chipinge", "Makoni", "Mutare", "Mutasa", "Nyanga"],
        ),
        (
            "Mashonaland Central",
            vec!["Bindura", "Guruve", "Mazowe", "Mbire", "Mount Darwin", "Rushinga", "Shamva"],
        ),
        (
            "Mashonaland East",
            vec![
                "Chikomba",
                "Goromonzi",
                "Marondera",
                "Murehwa",
                "Mutoko",
                "Seke",
                "Uzumba-Maramba-Pfungwe",
                "Wedza",
            ],
        ),
        (
            "Mashonaland West",
            vec![
                "Chegutu",
                "Hurungwe",
                "Kadoma",
                "Kariba",
                "Makonde",
                "Mhondoro-Ngezi",
                "Sanyati",
                "Zvimba",
            ],
        ),
        (
            "Masvingo",
            vec!["Bikita", "Chiredzi", "Chivi", "Gutu", "Masvingo", "Mwenezi", "Zaka"],
        ),
        (
            "Matabeleland North",
            vec!["Binga", "Hwange", "Lupane", "Nkayi", "Tsholotsho", "Umguza"],
        ),
        (
            "Matabeleland South",
            vec!["Beitbridge", "Gwanda", "Insiza", "Matobo", "Mangwe", "Umzingwane"],
        ),
        (
            "Midlands",
            vec![
                "Chirumhanzu",
                "Gokwe North",
                "Gokwe South",
                "Kwekwe",
                "Mberengwa",
                "Shurugwi",
                "Zvishavane",
                "Gweru",
            ],
        ),
    ]
});

/// The top jurisdiction. Users placed here see every province.
pub const HEAD_OFFICE: &str = "Head Office";

/// All known province names, in table order.
pub fn all_provinces() -> Vec<&'static str> {
    PROVINCE_DISTRICTS.iter().map(|(p, _)| *p).collect()
}

pub fn province_exists(province: &str) -> bool {
    PROVINCE_DISTRICTS.iter().any(|(p, _)| *p == province)
}

/// Ordered district names for a province. Empty for Head Office and for
/// unknown provinces.
pub fn districts_of(province: &str) -> &'static [&'static str] {
    PROVINCE_DISTRICTS
        .iter()
        .find(|(p, _)| *p == province)
        .map(|(_, d)| d.as_slice())
        .unwrap_or(&[])
}

/// Comma-joined district list for a province, used as the multi-district
/// marker on AdminProvince users.
pub fn joined_districts(province: &str) -> Option<String> {
    let districts = districts_of(province);
    if districts.is_empty() {
        None
    } else {
        Some(districts.join(", "))
    }
}

/// Validate a province/district pair. Head Office takes no district. A
/// district value may also be a comma-joined subset of the province's
/// districts (the AdminProvince marker form).
pub fn is_valid_location(province: &str, district: &str) -> bool {
    if !province_exists(province) {
        return false;
    }
    if province == HEAD_OFFICE {
        return district.is_empty();
    }
    if district.is_empty() {
        return false;
    }
    let known = districts_of(province);
    if district.contains(',') {
        return district.split(',').map(str::trim).all(|d| known.contains(&d));
    }
    known.contains(&district)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_office_has_no_districts() {
        assert!(districts_of(HEAD_OFFICE).is_empty());
        assert!(is_valid_location(HEAD_OFFICE, ""));
        assert!(!is_valid_location(HEAD_OFFICE, "Harare District"));
    }

    #[test]
    fn test_known_pair_is_valid() {
        assert!(is_valid_location("Harare", "Harare District"));
        assert!(is_valid_location("Manicaland", "Mutare"));
        assert!(!is_valid_location("Harare", "Mutare"));
        assert!(!is_valid_location("Narnia", "Anywhere"));
    }

    #[test]
    fn test_comma_joined_subset_is_valid() {
        assert!(is_valid_location("Masvingo", "Bikita, Chiredzi, Gutu"));
        assert!(!is_valid_location("Masvingo", "Bikita, Hwange"));
    }

    #[test]
    fn test_joined_districts_marker() {
        let joined = joined_districts("Matabeleland North").unwrap();
        assert!(joined.starts_with("Binga, "));
        assert!(joined.contains("Umguza"));
        assert!(joined_districts(HEAD_OFFICE).is_none());
    }
}
