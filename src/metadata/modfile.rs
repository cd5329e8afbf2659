use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::metadata::side::Side;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModToml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub side: Side,
    pub download: ModDownload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModDownload {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(
        default,
        rename = "hash-format",
        skip_serializing_if = "Option::is_none"
    )]
    pub hash_format: Option<HashFormat>,
    #[serde(default)]
    pub mode: DownloadMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFormat {
    Sha1,
    Sha256,
    Sha512,
    Md5,
    Murmur2,
}

impl HashFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            HashFormat::Sha1 => "sha1",
            HashFormat::Sha256 => "sha256",
            HashFormat::Sha512 => "sha512",
            HashFormat::Md5 => "md5",
            HashFormat::Murmur2 => "murmur2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    #[default]
    Url,
    Curseforge,
}

impl Serialize for DownloadMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(match self {
            DownloadMode::Url => "url",
            DownloadMode::Curseforge => "metadata:curseforge",
        })
    }
}

impl<'de> Deserialize<'de> for DownloadMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ModeVisitor;
        impl Visitor<'_> for ModeVisitor {
            type Value = DownloadMode;
            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter
                    .write_str("a download mode string: \"\", \"url\" or \"metadata:curseforge\"")
            }
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match v {
                    "" | "url" => Ok(DownloadMode::Url),
                    "metadata:curseforge" => Ok(DownloadMode::Curseforge),
                    other => Err(E::invalid_value(Unexpected::Str(other), &self)),
                }
            }
        }
        deserializer.deserialize_any(ModeVisitor)
    }
}
