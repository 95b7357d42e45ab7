//! Post-conversion transform pipeline
//!
//! An ordered, total sequence of transforms applied to a generator's
//! resource collection after discovery. Every transform filters by `kind`
//! before touching a resource, a transform that does not apply leaves the
//! resource unmodified, and nothing here aborts or propagates. Applying a
//! pipeline twice yields the same attributes as applying it once.

use super::resource::Resource;

/// The documented transform classes.
#[derive(Debug, Clone)]
pub enum Transform {
    /// Remove an attribute whose value equals a known provider-side
    /// implicit default, to avoid emitting a redundant literal.
    DropDefault {
        kind: String,
        attribute: String,
        default: String,
    },
    /// Rewrite a multi-line string attribute into a block literal bounded
    /// by `marker`, escaping interpolation tokens before wrapping so the
    /// renderer treats the content as raw text.
    LiteralBlock {
        kind: String,
        attribute: String,
        marker: String,
    },
    /// Delete an attribute a later import/refresh stage owns. With a
    /// sentinel, delete only when the value equals it (the provider's
    /// "unset" marker); without one, delete unconditionally.
    StripDerived {
        kind: String,
        attribute: String,
        sentinel: Option<String>,
    },
}

impl Transform {
    fn kind(&self) -> &str {
        match self {
            Self::DropDefault { kind, .. }
            | Self::LiteralBlock { kind, .. }
            | Self::StripDerived { kind, .. } => kind,
        }
    }

    fn apply(&self, resource: &mut Resource) {
        match self {
            Self::DropDefault {
                attribute, default, ..
            } => {
                if resource.attributes.get(attribute) == Some(default) {
                    resource.attributes.remove(attribute);
                }
            }
            Self::LiteralBlock {
                attribute, marker, ..
            } => {
                if let Some(value) = resource.attributes.get(attribute) {
                    if let Some(wrapped) = literal_block(value, marker) {
                        resource.attributes.insert(attribute.clone(), wrapped);
                    }
                }
            }
            Self::StripDerived {
                attribute, sentinel, ..
            } => {
                let matches = match sentinel {
                    Some(sentinel) => resource.attributes.get(attribute) == Some(sentinel),
                    None => resource.attributes.contains_key(attribute),
                };
                if matches {
                    resource.attributes.remove(attribute);
                }
            }
        }
    }
}

/// Escape provider interpolation tokens so the renderer does not
/// reinterpret them: `${` becomes `$${`.
pub fn escape_interpolation(value: &str) -> String {
    value.replace("${", "$${")
}

/// Wrap `value` in a block literal bounded by `marker`. Returns `None` when
/// the value is already wrapped; that check is what keeps repeated
/// application from escaping the content twice.
fn literal_block(value: &str, marker: &str) -> Option<String> {
    let head = format!("<<{marker}\n");
    let tail = format!("\n{marker}");
    if value.starts_with(&head) && value.ends_with(&tail) {
        return None;
    }
    Some(format!(
        "<<{marker}\n{}\n{marker}",
        escape_interpolation(value)
    ))
}

/// Ordered transform sequence over a heterogeneous resource collection.
#[derive(Debug, Default)]
pub struct TransformPipeline {
    transforms: Vec<Transform>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Apply every transform in order, in place. Total: resources of other
    /// kinds and resources a transform does not apply to are untouched.
    pub fn apply(&self, resources: &mut [Resource]) {
        for transform in &self.transforms {
            for resource in resources
                .iter_mut()
                .filter(|r| r.kind == transform.kind())
            {
                transform.apply(resource);
            }
        }
    }
}
