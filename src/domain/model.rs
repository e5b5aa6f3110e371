//! Class model: the materialized classes and methods handed in by an external source-model
//! provider (a compiler front-end, an AST library, a hand-written fixture).
//!
//! The model is read-only once built. Classes and methods are addressed by stable positional
//! identifiers ([`ClassId`], [`MethodId`]) so that downstream structures (call graph, clusters)
//! never hold references into the model.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Position of a class in [`ClassModel::classes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub usize);

/// Owning class + position of the method within that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId {
    pub class: ClassId,
    pub index: usize,
}

/// Matches `name:paramCount`. Names carry no whitespace or colon; receivers are not recorded.
fn call_signature_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^\s:]+)\s*:\s*(\d+)$").expect("call signature regex"))
}

/// Resolution key of a method: name + parameter count. No type information.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallSignature {
    pub name: String,
    pub arity: u32,
}

impl CallSignature {
    pub fn new(name: impl Into<String>, arity: u32) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for CallSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.arity)
    }
}

impl FromStr for CallSignature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = call_signature_regex()
            .captures(s.trim())
            .ok_or_else(|| anyhow::anyhow!("Invalid call signature '{s}', expected name:paramCount"))?;
        let arity = caps[2]
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid parameter count in '{s}': {e}"))?;
        Ok(Self::new(&caps[1], arity))
    }
}

impl TryFrom<String> for CallSignature {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CallSignature> for String {
    fn from(sig: CallSignature) -> Self {
        sig.to_string()
    }
}

/// A method as extracted by the source-model provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodUnit {
    pub name: String,
    #[serde(default)]
    pub param_count: u32,
    #[serde(default)]
    pub line_count: u32,
    /// Invocations found in the body, recorded textually. A set: repeated calls collapse.
    #[serde(default, rename = "calls", deserialize_with = "deserialize_calls")]
    pub call_signatures: BTreeSet<CallSignature>,
}

/// Malformed entries are skipped with a warning instead of failing the whole model.
fn deserialize_calls<'de, D>(deserializer: D) -> Result<BTreeSet<CallSignature>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|entry| match entry.parse::<CallSignature>() {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!(entry = %entry, error = %e, "skipping malformed call signature");
                None
            }
        })
        .collect())
}

impl MethodUnit {
    pub fn new(name: impl Into<String>, param_count: u32) -> Self {
        Self {
            name: name.into(),
            param_count,
            line_count: 0,
            call_signatures: BTreeSet::new(),
        }
    }

    pub fn with_call(mut self, name: impl Into<String>, arity: u32) -> Self {
        self.call_signatures.insert(CallSignature::new(name, arity));
        self
    }

    pub fn with_lines(mut self, line_count: u32) -> Self {
        self.line_count = line_count;
        self
    }

    /// The signature other methods use to reach this one.
    pub fn signature(&self) -> CallSignature {
        CallSignature::new(self.name.clone(), self.param_count)
    }
}

/// A class as extracted by the source-model provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassUnit {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub attribute_count: u32,
    #[serde(default)]
    pub methods: Vec<MethodUnit>,
}

impl ClassUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: String::new(),
            attribute_count: 0,
            methods: Vec::new(),
        }
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_method(mut self, method: MethodUnit) -> Self {
        self.methods.push(method);
        self
    }

    /// `package.Name`, or just `Name` for the default package.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Wire form of the provider's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassModelDocument {
    #[serde(default)]
    pub classes: Vec<ClassUnit>,
}

/// Ordered, name-unique set of classes under analysis.
#[derive(Debug, Clone, Default)]
pub struct ClassModel {
    classes: Vec<ClassUnit>,
    names: Vec<String>,
}

impl ClassModel {
    /// Builds the model, keeping the first class seen for each qualified name.
    pub fn new(classes: Vec<ClassUnit>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(classes.len());
        let mut names = Vec::with_capacity(classes.len());

        for class in classes {
            let qualified = class.qualified_name();
            if !seen.insert(qualified.clone()) {
                warn!(class = %qualified, "duplicate class name, keeping first occurrence");
                continue;
            }
            names.push(qualified);
            kept.push(class);
        }

        Self {
            classes: kept,
            names,
        }
    }

    pub fn classes(&self) -> &[ClassUnit] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class(&self, id: ClassId) -> &ClassUnit {
        &self.classes[id.0]
    }

    /// Qualified name of a class.
    pub fn name(&self, id: ClassId) -> &str {
        &self.names[id.0]
    }

    /// Qualified names in class order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn class_id(&self, qualified_name: &str) -> Option<ClassId> {
        self.names
            .iter()
            .position(|n| n == qualified_name)
            .map(ClassId)
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(ClassId)
    }

    pub fn method(&self, id: MethodId) -> &MethodUnit {
        &self.classes[id.class.0].methods[id.index]
    }

    /// All methods in class order, then declaration order.
    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.classes.iter().enumerate().flat_map(|(c, class)| {
            (0..class.methods.len()).map(move |index| MethodId {
                class: ClassId(c),
                index,
            })
        })
    }

    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }

    /// Display label `Class.method:arity`.
    pub fn method_label(&self, id: MethodId) -> String {
        let method = self.method(id);
        format!("{}.{}", self.name(id.class), method.signature())
    }

    /// Keeps only classes accepted by `keep`, preserving order.
    pub fn retain(self, keep: impl Fn(&ClassUnit) -> bool) -> Self {
        let (classes, names) = self
            .classes
            .into_iter()
            .zip(self.names)
            .filter(|(class, _)| keep(class))
            .unzip();
        Self { classes, names }
    }
}

impl From<ClassModelDocument> for ClassModel {
    fn from(doc: ClassModelDocument) -> Self {
        Self::new(doc.classes)
    }
}
