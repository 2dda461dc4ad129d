use alloc::string::{String, ToString};
use alloc::vec::Vec;
use kernel_api::pnp::BootType;
use toml::de::DeTable;

const PACKAGE_TOML: &str = include_str!("USBSTOR.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestError {
    Parse,
    MissingField(&'static str),
    BadStartType,
}

/// Driver package description installed next to the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverManifest {
    pub image: String,
    pub start: BootType,
    pub class: Option<String>,
    pub hwids: Vec<String>,
}

impl DriverManifest {
    pub fn parse(src: &str) -> Result<Self, ManifestError> {
        let (tbl_span, errs) = DeTable::parse_recoverable(src);
        if !errs.is_empty() {
            return Err(ManifestError::Parse);
        }
        let tbl = tbl_span.get_ref();

        let image = tbl
            .get("image")
            .and_then(|v| v.get_ref().as_str())
            .map(|s| s.to_string())
            .ok_or(ManifestError::MissingField("image"))?;

        let start = tbl
            .get("start")
            .and_then(|v| v.get_ref().as_str())
            .ok_or(ManifestError::MissingField("start"))
            .and_then(|s| BootType::from_str(s).ok_or(ManifestError::BadStartType))?;

        let class = tbl
            .get("class")
            .and_then(|v| v.get_ref().as_str())
            .map(ToString::to_string);

        let hwids = tbl
            .get("hwids")
            .and_then(|v| v.get_ref().as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|val| val.get_ref().as_str().map(ToString::to_string))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(Self {
            image,
            start,
            class,
            hwids,
        })
    }

    pub fn matches_hwid(&self, hwid: &str) -> bool {
        self.hwids.iter().any(|h| h.eq_ignore_ascii_case(hwid))
    }
}

/// The manifest shipped with this driver.
pub fn package_manifest() -> Result<DriverManifest, ManifestError> {
    DriverManifest::parse(PACKAGE_TOML)
}
