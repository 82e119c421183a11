use std::path::PathBuf;

use flatjl_schema::Namespace;
use serde::Deserialize;

use crate::error::GenError;
use crate::utils::is_identifier;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Concatenate every entity into one unit instead of one unit per entity.
    pub single_file:        bool,
    /// Dotted namespace that replaces each entity's own when laying out files.
    pub namespace_override: Option<String>,
    pub output_dir:         PathBuf,
    /// Base name of the single-file unit.
    pub file_name:          String,
    pub file_suffix:        String,
    /// Statement that brings the FlatBuffers runtime into scope.
    pub runtime_import:     String,
    /// Fail on union fields instead of emitting a placeholder.
    pub strict_unions:      bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            single_file:        false,
            namespace_override: None,
            output_dir:         PathBuf::from("."),
            file_name:          "schema".to_string(),
            file_suffix:        "_generated".to_string(),
            runtime_import:     "using FlatBuffers".to_string(),
            strict_unions:      false,
        }
    }
}

impl GeneratorOptions {
    /// The override as a namespace; the root namespace when unset.
    pub fn override_namespace(&self) -> Result<Namespace, GenError> {
        let Some(dotted) = &self.namespace_override else {
            return Ok(Namespace::default());
        };
        let ns = Namespace::from_dotted(dotted);
        if ns.components.iter().any(|c| !is_identifier(c)) {
            return Err(GenError::InvalidNamespace(dotted.clone()));
        }
        Ok(ns)
    }
}

#[test]
fn override_namespace_is_validated() {
    let mut options = GeneratorOptions::default();
    assert!(options.override_namespace().unwrap().is_root());

    options.namespace_override = Some("Game.Items".into());
    assert_eq!(options.override_namespace().unwrap().components, vec!["Game", "Items"]);

    options.namespace_override = Some("Game.1tems".into());
    assert!(matches!(options.override_namespace(), Err(GenError::InvalidNamespace(_))));
}

#[test]
fn options_deserialize_with_defaults() {
    let options: GeneratorOptions = serde_json::from_str(r#"{ "single_file": true }"#).unwrap();
    assert!(options.single_file);
    assert_eq!(options.file_suffix, "_generated");
    assert_eq!(options.runtime_import, "using FlatBuffers");
}
