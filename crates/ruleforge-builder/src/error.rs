//! Build-time error taxonomy.
//!
//! Every variant names the asset, field, or helper it concerns; a build
//! error is fatal to the asset being compiled. Evaluation of an
//! already-compiled expression never produces one of these.

use thiserror::Error;

use crate::builders::operation::OperationMode;

#[derive(Debug, Error)]
pub enum BuildError {
    /// The definition root is not a JSON object.
    #[error("asset definition must be a JSON object")]
    NotAnObject,

    /// The definition has no string `name` entry.
    #[error("asset definition is missing a string 'name'")]
    MissingName,

    /// The asset name does not start with a known kind segment.
    #[error("asset '{name}': unknown asset kind '{prefix}' (expected decoder, rule, or output)")]
    UnknownAssetKind { name: String, prefix: String },

    /// A definition section that is neither a stage nor bookkeeping.
    #[error("asset '{asset}': unknown stage '{stage}'")]
    UnknownStage { asset: String, stage: String },

    /// A stage body with the wrong shape or no content.
    #[error("asset '{asset}': {stage} stage is malformed: {reason}")]
    InvalidStage {
        asset: String,
        stage: String,
        reason: String,
    },

    /// A definition that contains no stages at all.
    #[error("asset '{name}': definition contains no stages")]
    EmptyAsset { name: String },

    /// A `+helper/...` value naming a helper nobody registered.
    #[error("field '{field}': unknown helper '{name}'")]
    UnknownHelper { name: String, field: String },

    /// A `+` value with nothing before the first `/`.
    #[error("field '{field}': helper call '{value}' has an empty helper name")]
    EmptyHelperName { field: String, value: String },

    /// A helper invoked with the wrong number or shape of arguments.
    #[error("helper '{helper}' on field '{field}': {reason}")]
    BadHelperArgs {
        helper: String,
        field: String,
        reason: String,
    },

    /// A helper argument that fails to compile as a regular expression.
    #[error("helper '{helper}' on field '{field}': invalid pattern: {source}")]
    BadPattern {
        helper: String,
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A helper argument pair that fails to parse as an IP network.
    #[error("helper '{helper}' on field '{field}': invalid network '{network}': {source}")]
    BadNetwork {
        helper: String,
        field: String,
        network: String,
        #[source]
        source: ipnet::AddrParseError,
    },

    /// A helper invoked in a mode it does not support.
    #[error("helper '{helper}' on field '{field}' cannot be used in {mode} mode")]
    UnsupportedMode {
        helper: String,
        field: String,
        mode: OperationMode,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;
