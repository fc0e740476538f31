//! Province code registry used to key regional poverty lines.
//!
//! Names follow the statistics agency's upper-case spelling.

const PROVINCES: &[(u16, &str)] = &[
    (11, "ACEH"),
    (12, "SUMATERA UTARA"),
    (13, "SUMATERA BARAT"),
    (14, "RIAU"),
    (15, "JAMBI"),
    (16, "SUMATERA SELATAN"),
    (17, "BENGKULU"),
    (18, "LAMPUNG"),
    (19, "BANGKA BELITUNG"),
    (21, "KEPULAUAN RIAU"),
    (31, "DKI JAKARTA"),
    (32, "JAWA BARAT"),
    (33, "JAWA TENGAH"),
    (34, "DI YOGYAKARTA"),
    (35, "JAWA TIMUR"),
    (36, "BANTEN"),
    (51, "BALI"),
    (52, "NUSA TENGGARA BARAT"),
    (53, "NUSA TENGGARA TIMUR"),
    (61, "KALIMANTAN BARAT"),
    (62, "KALIMANTAN TENGAH"),
    (63, "KALIMANTAN SELATAN"),
    (64, "KALIMANTAN TIMUR"),
    (65, "KALIMANTAN UTARA"),
    (71, "SULAWESI UTARA"),
    (72, "SULAWESI TENGAH"),
    (73, "SULAWESI SELATAN"),
    (74, "SULAWESI TENGGARA"),
    (75, "GORONTALO"),
    (76, "SULAWESI BARAT"),
    (81, "MALUKU"),
    (82, "MALUKU UTARA"),
    (91, "PAPUA BARAT"),
    (92, "PAPUA BARAT DAYA"),
    (94, "PAPUA"),
    (95, "PAPUA SELATAN"),
    (96, "PAPUA TENGAH"),
    (97, "PAPUA PEGUNUNGAN"),
];

/// Province name for a two-digit code.
pub fn province_name(code: i64) -> Option<&'static str> {
    PROVINCES
        .iter()
        .find(|(c, _)| i64::from(*c) == code)
        .map(|(_, name)| *name)
}

/// Province code for a name (case-insensitive, surrounding whitespace ignored).
pub fn province_code(name: &str) -> Option<i64> {
    let name = name.trim();
    PROVINCES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(c, _)| i64::from(*c))
}
