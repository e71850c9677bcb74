//! Model base and model configuration records.
//!
//! Both records can be deserialized with [`serde`] or built from `key=value` argument lists:
//! ```
//! use relrdf::config::{ModelConfig, ModelKind};
//!
//! let config = ModelConfig::from_args(["type=twoway", "versionA=1", "versionB=2"])?;
//! assert_eq!(config.kind, ModelKind::TwoWay);
//! assert_eq!(config.version_b, Some(2));
//! # Result::<_, relrdf::InstantiationError>::Ok(())
//! ```

use crate::error::{InstantiationError, ModelBaseError};
use crate::modelbase::ModelBase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Names a model base backend and its parameters.
///
/// The `sqlite` backend reads the `path` parameter, `:memory:` or no path opening an in-memory database.
/// The `debug` backend stores nothing and only provides the debug sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBaseConfig {
    pub backend: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl ModelBaseConfig {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            params: BTreeMap::new(),
        }
    }

    /// A SQLite model base stored in the given file.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self::new("sqlite").with_param("path", path)
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Builds the configuration from a backend name and `key=value` parameters.
    pub fn from_args(
        backend: impl Into<String>,
        args: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, InstantiationError> {
        let mut config = Self::new(backend);
        for arg in args {
            let (key, value) = split_arg(arg.as_ref())?;
            config.params.insert(key.into(), value.into());
        }
        Ok(config)
    }
}

/// Opens the model base described by `config`.
///
/// The backend name is case-insensitive.
pub fn open_modelbase(config: &ModelBaseConfig) -> Result<ModelBase, ModelBaseError> {
    if config.backend.eq_ignore_ascii_case("sqlite") {
        for key in config.params.keys() {
            if key != "path" {
                return Err(InstantiationError::new(format!(
                    "Unknown parameter '{key}' for the sqlite model base"
                ))
                .into());
            }
        }
        match config.params.get("path").map(String::as_str) {
            None | Some(":memory:") => ModelBase::open_in_memory(),
            Some(path) => ModelBase::open(path),
        }
    } else if config.backend.eq_ignore_ascii_case("debug") {
        Ok(ModelBase::debug())
    } else {
        Err(InstantiationError::new(format!(
            "Invalid model base type '{}'",
            config.backend
        ))
        .into())
    }
}

/// The views a model base can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Version 1 with native access to the statements as resources.
    MetaVersion,
    /// A single version as the only context.
    SingleVersion,
    /// Every stored version as its own context.
    AllVersions,
    /// The comparison of versions A and B.
    TwoWay,
    /// The comparison of versions A, B and C.
    ThreeWay,
}

impl ModelKind {
    pub const ALL: [Self; 5] = [
        Self::MetaVersion,
        Self::SingleVersion,
        Self::AllVersions,
        Self::TwoWay,
        Self::ThreeWay,
    ];

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::MetaVersion => "metaversion",
            Self::SingleVersion => "singleversion",
            Self::AllVersions => "allversions",
            Self::TwoWay => "twoway",
            Self::ThreeWay => "threeway",
        }
    }

    /// The version parameters the view requires.
    fn required_versions(self) -> &'static [&'static str] {
        match self {
            Self::MetaVersion | Self::AllVersions => &[],
            Self::SingleVersion => &["versionA"],
            Self::TwoWay => &["versionA", "versionB"],
            Self::ThreeWay => &["versionA", "versionB", "versionC"],
        }
    }
}

impl fmt::Display for ModelKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = InstantiationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| InstantiationError::new(format!("Invalid model type '{name}'")))
    }
}

/// A view over a model base.
///
/// `version_a` is the version of a `singleversion` model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(rename = "type")]
    pub kind: ModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_a: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_b: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_c: Option<u32>,
    /// Base IRI of the queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_graph: Option<String>,
    /// Prefix of the version context URIs, `relrdf:version` by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_uri: Option<String>,
}

impl ModelConfig {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            version_a: None,
            version_b: None,
            version_c: None,
            base_graph: None,
            version_uri: None,
        }
    }

    pub fn single_version(version: u32) -> Self {
        Self {
            version_a: Some(version),
            ..Self::new(ModelKind::SingleVersion)
        }
    }

    pub fn two_way(a: u32, b: u32) -> Self {
        Self {
            version_a: Some(a),
            version_b: Some(b),
            ..Self::new(ModelKind::TwoWay)
        }
    }

    pub fn three_way(a: u32, b: u32, c: u32) -> Self {
        Self {
            version_a: Some(a),
            version_b: Some(b),
            version_c: Some(c),
            ..Self::new(ModelKind::ThreeWay)
        }
    }

    /// Builds the configuration from `key=value` arguments.
    ///
    /// The keys are `type`, `versionA`, `versionB`, `versionC`, `baseGraph` and `versionUri`.
    pub fn from_args(
        args: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, InstantiationError> {
        let mut kind = None;
        let mut config = Self::new(ModelKind::SingleVersion);
        for arg in args {
            let (key, value) = split_arg(arg.as_ref())?;
            match key {
                "type" => kind = Some(value.parse()?),
                "versionA" => config.version_a = Some(parse_version(key, value)?),
                "versionB" => config.version_b = Some(parse_version(key, value)?),
                "versionC" => config.version_c = Some(parse_version(key, value)?),
                "baseGraph" => config.base_graph = Some(value.into()),
                "versionUri" => config.version_uri = Some(value.into()),
                _ => {
                    return Err(InstantiationError::new(format!(
                        "Unknown model parameter '{key}'"
                    )));
                }
            }
        }
        config.kind = kind.ok_or_else(|| InstantiationError::new("Missing model type"))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the versions the view needs are provided.
    pub fn validate(&self) -> Result<(), InstantiationError> {
        for name in self.kind.required_versions() {
            let value = match *name {
                "versionA" => self.version_a,
                "versionB" => self.version_b,
                _ => self.version_c,
            };
            if value.is_none() {
                return Err(InstantiationError::new(format!(
                    "Missing parameter '{name}' for a {} model",
                    self.kind
                )));
            }
        }
        Ok(())
    }
}

fn split_arg(arg: &str) -> Result<(&str, &str), InstantiationError> {
    arg.split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
        .ok_or_else(|| InstantiationError::new(format!("Expecting key=value, found '{arg}'")))
}

fn parse_version(name: &str, value: &str) -> Result<u32, InstantiationError> {
    value.parse().map_err(|_| {
        InstantiationError::new(format!(
            "Invalid version number '{value}' for parameter '{name}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_from_args() -> Result<(), InstantiationError> {
        let config = ModelConfig::from_args(["type=threeway", "versionA=3", "versionB=1", "versionC=2"])?;
        assert_eq!(config, ModelConfig::three_way(3, 1, 2));
        let config = ModelConfig::from_args(["type=AllVersions"])?;
        assert_eq!(config.kind, ModelKind::AllVersions);
        Ok(())
    }

    #[test]
    fn invalid_model_args() {
        let error = ModelConfig::from_args(["type=singleversion", "versionA=x"]).unwrap_err();
        assert_eq!(
            error.message(),
            "Invalid version number 'x' for parameter 'versionA'"
        );
        let error = ModelConfig::from_args(["type=twoway", "versionA=1"]).unwrap_err();
        assert_eq!(
            error.message(),
            "Missing parameter 'versionB' for a twoway model"
        );
        let error = ModelConfig::from_args(["type=singleversion", "colour=red"]).unwrap_err();
        assert_eq!(error.message(), "Unknown model parameter 'colour'");
        let error = ModelConfig::from_args(["type=fourway"]).unwrap_err();
        assert_eq!(error.message(), "Invalid model type 'fourway'");
        assert!(ModelConfig::from_args(["versionA"]).is_err());
    }

    #[test]
    fn model_serde() -> Result<(), serde_json::Error> {
        let config: ModelConfig =
            serde_json::from_str(r#"{"type":"twoway","versionA":1,"versionB":2}"#)?;
        assert_eq!(config, ModelConfig::two_way(1, 2));
        assert_eq!(
            serde_json::to_string(&ModelConfig::single_version(4))?,
            r#"{"type":"singleversion","versionA":4}"#
        );
        Ok(())
    }

    #[test]
    fn unknown_backend() {
        let Err(ModelBaseError::Instantiation(error)) =
            open_modelbase(&ModelBaseConfig::new("oracle"))
        else {
            panic!("the backend should be rejected");
        };
        assert_eq!(error.message(), "Invalid model base type 'oracle'");
    }

    #[test]
    fn backend_names_ignore_case() -> Result<(), ModelBaseError> {
        open_modelbase(&ModelBaseConfig::new("SQLite"))?;
        open_modelbase(&ModelBaseConfig::from_args("debug", Vec::<String>::new())?)?;
        Ok(())
    }
}
