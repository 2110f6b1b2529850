//! Defines the configuration structures for a fragmentation pipeline: which files to read and
//! which transformers (and matchers) to put in front of the fragmentation strategy.

use crate::errors::ConfigurationError;
use crate::io::{CompositeSource, FileSource, QuadSource};
use crate::matcher::{QuadMatcher, ResourceTypeMatcher, TermValueMatcher};
use crate::options::{ResourceScope, TermPosition};
use crate::transform::{
    BlankToNamedTransformer, CloneTransformer, DeduplicateTransformer, DistributeIriTransformer,
    FilterTransformer, IdentityTransformer, QuadTransformer, ReplaceIriTransformer,
    SequentialTransformer, SetIriExtensionTransformer,
};
use anyhow::{Error, Result};
use derive_builder::Builder;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MatcherConfig {
    ResourceType {
        #[serde(with = "serde_regex")]
        type_regex: Regex,
        #[serde(default)]
        scope: ResourceScope,
    },
    TermValue {
        position: TermPosition,
        #[serde(with = "serde_regex")]
        value_regex: Regex,
        // defaults to 1.0
        #[serde(default, skip_serializing_if = "Option::is_none")]
        probability: Option<f64>,
    },
}

impl MatcherConfig {
    pub fn build(&self) -> Result<Box<dyn QuadMatcher>> {
        Ok(match self {
            MatcherConfig::ResourceType { type_regex, scope } => {
                Box::new(ResourceTypeMatcher::new(type_regex.clone(), *scope))
            }
            MatcherConfig::TermValue {
                position,
                value_regex,
                probability,
            } => Box::new(TermValueMatcher::new(
                *position,
                value_regex.clone(),
                *probability,
            )?),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TransformerConfig {
    Identity,
    Clone,
    ReplaceIri {
        #[serde(with = "serde_regex")]
        search: Regex,
        replacement: String,
    },
    BlankToNamed {
        #[serde(with = "serde_regex")]
        search: Regex,
        replacement: String,
    },
    SetIriExtension {
        extension: String,
    },
    DistributeIri {
        #[serde(with = "serde_regex")]
        search: Regex,
        replacements: Vec<String>,
    },
    Filter {
        matcher: MatcherConfig,
    },
    Deduplicate,
    Sequential {
        transformers: Vec<TransformerConfig>,
    },
}

impl TransformerConfig {
    pub fn build(&self) -> Result<Box<dyn QuadTransformer>> {
        Ok(match self {
            TransformerConfig::Identity => Box::new(IdentityTransformer),
            TransformerConfig::Clone => Box::new(CloneTransformer),
            TransformerConfig::ReplaceIri {
                search,
                replacement,
            } => Box::new(ReplaceIriTransformer::new(search.clone(), replacement)),
            TransformerConfig::BlankToNamed {
                search,
                replacement,
            } => Box::new(BlankToNamedTransformer::new(search.clone(), replacement)),
            TransformerConfig::SetIriExtension { extension } => {
                Box::new(SetIriExtensionTransformer::new(extension)?)
            }
            TransformerConfig::DistributeIri {
                search,
                replacements,
            } => Box::new(DistributeIriTransformer::new(
                search.clone(),
                replacements.clone(),
            )?),
            TransformerConfig::Filter { matcher } => {
                Box::new(FilterTransformer::new(matcher.build()?))
            }
            TransformerConfig::Deduplicate => Box::new(DeduplicateTransformer::new()),
            TransformerConfig::Sequential { transformers } => {
                let chain = transformers
                    .iter()
                    .map(|t| t.build())
                    .collect::<Result<Vec<_>>>()?;
                Box::new(SequentialTransformer::new(chain))
            }
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Builder)]
#[builder(default, setter(into))]
pub struct PipelineConfig {
    /// RDF files read one after the other
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Transformers applied in order to every quad
    #[serde(default)]
    pub transformers: Vec<TransformerConfig>,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: PipelineConfig = serde_json::from_reader(reader)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    /// Creates the composite source over all configured files. Missing files are reported
    /// here rather than in the middle of a run.
    pub fn build_source(&self) -> Result<Box<dyn QuadSource>> {
        let mut composite = CompositeSource::default();
        for path in &self.sources {
            if !path.is_file() {
                return Err(Error::new(ConfigurationError::new(
                    "source",
                    format!("{} is not a readable file", path.display()),
                )));
            }
            composite.push(Box::new(FileSource::new(path.clone())));
        }
        debug!("Configured {} sources", composite.len());
        Ok(Box::new(composite))
    }

    pub fn build_transformers(&self) -> Result<Vec<Box<dyn QuadTransformer>>> {
        self.transformers.iter().map(|t| t.build()).collect()
    }
}
