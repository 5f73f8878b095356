use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionCode {
    Hk,
    Tw,
    Sg,
    My,
    Cn,
}

impl RegionCode {
    const ALL: [RegionCode; 5] = [Self::Hk, Self::Tw, Self::Sg, Self::My, Self::Cn];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hk => "hk",
            Self::Tw => "tw",
            Self::Sg => "sg",
            Self::My => "my",
            Self::Cn => "cn",
        }
    }

    pub fn from_country(value: &str) -> Option<Self> {
        let lowered = value.trim().to_lowercase();
        let region = match lowered.as_str() {
            "hk" | "hkg" | "hong kong" | "hong kong sar" | "香港" => Self::Hk,
            "tw" | "twn" | "taiwan" | "台灣" | "台湾" => Self::Tw,
            "sg" | "sgp" | "singapore" | "新加坡" => Self::Sg,
            "my" | "mys" | "malaysia" | "馬來西亞" | "马来西亚" => Self::My,
            "cn" | "chn" | "china" | "中國" | "中国" => Self::Cn,
            _ => return None,
        };
        Some(region)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.as_str() == code)
    }

    // Matches whole path segments, so "/hk/" and a trailing "/hk" both count
    // but "/hkg/" does not.
    pub fn from_url(url: &str) -> Option<Self> {
        let lowered = url.to_lowercase();
        let without_scheme = lowered
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(lowered.as_str());
        let path = without_scheme.split(['?', '#']).next().unwrap_or_default();

        path.split('/').skip(1).find_map(Self::from_code)
    }
}

// Advisory only: an explicit country column wins over URL path hints.
pub fn infer_region<'a>(
    countries: impl IntoIterator<Item = &'a str>,
    page: &str,
) -> Option<RegionCode> {
    countries
        .into_iter()
        .find_map(RegionCode::from_country)
        .or_else(|| RegionCode::from_url(page))
}
