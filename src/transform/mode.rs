//! Target modes and their linearize/reassemble pipelines.

use std::fmt;

use tracing::debug;

use crate::collection::{Result, Value};

/// Output shape produced by a memoized transform.
///
/// Each mode selects how the input container is linearized into entries
/// before its values are mapped, and how the mapped entries are reassembled.
///
/// | mode     | linearize        | reassemble   |
/// |----------|------------------|--------------|
/// | `Same`   | identity         | identity     |
/// | `Array`  | `value_seq`      | `to_array`   |
/// | `Object` | `to_keyed_seq`   | `to_object`  |
/// | `List`   | `value_seq`      | `to_list`    |
/// | `Map`    | `to_keyed_seq`   | `to_map`     |
/// | `Seq`    | `to_seq`         | identity     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TargetMode {
    /// Keep the input's container kind.
    #[default]
    Same,
    /// Plain string-keyed record.
    Object,
    /// Plain array of values, keys dropped.
    Array,
    /// Persistent list of values, keys dropped.
    List,
    /// Persistent map keyed like the input's entries.
    Map,
    /// Entry sequence that keeps the input's flavour.
    Seq,
}

impl TargetMode {
    /// Every mode, in declaration order.
    pub const ALL: [TargetMode; 6] = [
        TargetMode::Same,
        TargetMode::Object,
        TargetMode::Array,
        TargetMode::List,
        TargetMode::Map,
        TargetMode::Seq,
    ];

    /// Lowercase name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            TargetMode::Same => "same",
            TargetMode::Object => "object",
            TargetMode::Array => "array",
            TargetMode::List => "list",
            TargetMode::Map => "map",
            TargetMode::Seq => "seq",
        }
    }

    /// Resolves a mode by name, ignoring ASCII case.
    ///
    /// Unknown names are not an error: they resolve to [`TargetMode::Same`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use immutable_memo::transform::TargetMode;
    /// assert_eq!(TargetMode::from_name("object"), TargetMode::Object);
    /// assert_eq!(TargetMode::from_name("SEQ"), TargetMode::Seq);
    /// assert_eq!(TargetMode::from_name("vector"), TargetMode::Same);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match Self::ALL
            .iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(name))
        {
            Some(mode) => *mode,
            None => {
                debug!(mode = name, "unknown target mode, falling back to `same`");
                TargetMode::Same
            }
        }
    }

    /// The linearize/reassemble pair for this mode.
    pub fn pipeline(&self) -> Pipeline {
        match self {
            TargetMode::Same => Pipeline::new(identity, identity),
            TargetMode::Array => Pipeline::new(value_seq, to_array),
            TargetMode::Object => Pipeline::new(keyed_seq, to_object),
            TargetMode::List => Pipeline::new(value_seq, to_list),
            TargetMode::Map => Pipeline::new(keyed_seq, to_map),
            TargetMode::Seq => Pipeline::new(to_seq, identity),
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for TargetMode {
    fn from(name: &str) -> Self {
        TargetMode::from_name(name)
    }
}

impl From<Option<&str>> for TargetMode {
    fn from(name: Option<&str>) -> Self {
        name.map_or(TargetMode::Same, TargetMode::from_name)
    }
}

/// A single pipeline stage.
pub type Step = fn(&Value) -> Result<Value>;

/// Pair of pure stages bracketing the per-entry mapping of a transform.
#[derive(Clone, Copy)]
pub struct Pipeline {
    linearize: Step,
    reassemble: Step,
}

impl Pipeline {
    const fn new(linearize: Step, reassemble: Step) -> Self {
        Self {
            linearize,
            reassemble,
        }
    }

    /// Turns the input container into the form whose values get mapped.
    #[inline]
    pub fn linearize(&self, value: &Value) -> Result<Value> {
        (self.linearize)(value)
    }

    /// Builds the output container from the mapped form.
    #[inline]
    pub fn reassemble(&self, value: &Value) -> Result<Value> {
        (self.reassemble)(value)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

fn identity(value: &Value) -> Result<Value> {
    Ok(value.clone())
}

fn to_seq(value: &Value) -> Result<Value> {
    value.to_seq().map(Value::Seq)
}

fn keyed_seq(value: &Value) -> Result<Value> {
    value.to_keyed_seq().map(Value::Seq)
}

fn value_seq(value: &Value) -> Result<Value> {
    value.value_seq().map(Value::Seq)
}

fn to_array(value: &Value) -> Result<Value> {
    value.to_array().map(Value::Array)
}

fn to_object(value: &Value) -> Result<Value> {
    value.to_object().map(Value::Object)
}

fn to_list(value: &Value) -> Result<Value> {
    value.to_list().map(Value::List)
}

fn to_map(value: &Value) -> Result<Value> {
    value.to_map().map(Value::Map)
}
