//! Resolve a named subset into a rewritten manifest.

use log::debug;

use crate::error::SubsetError;
use crate::manifest::{DependencyMap, Manifest, omit, pick};

/// Check that `name` refers to a declared subset.
///
/// This is the validation half of [`resolve`] and never looks at the
/// dependency sections.
pub fn validate(manifest: &Manifest, name: &str) -> Result<(), SubsetError> {
    if name.is_empty() {
        return Err(SubsetError::MissingSubsetName);
    }
    manifest.subset(name).map(|_| ())
}

/// Produce the manifest to install for subset `name`.
///
/// `devDependencies` is narrowed by the subset's `include` list, or failing
/// that its `exclude` list. With `only_dev`, `dependencies` is emptied.
/// The input manifest is consumed and a new value returned; nothing is
/// written to disk.
pub fn resolve(manifest: Manifest, name: &str, only_dev: bool) -> Result<Manifest, SubsetError> {
    validate(&manifest, name)?;
    let declaration = manifest.subset(name)?;

    let dev = manifest.dev_dependencies();
    let dev = if let Some(include) = &declaration.include {
        pick(&dev, include)
    } else if let Some(exclude) = &declaration.exclude {
        omit(&dev, exclude)
    } else {
        return Err(SubsetError::InvalidSubsetDeclaration(name.to_string()));
    };
    debug!(
        "Subset '{}' keeps {} dev dependencies: {:?}",
        name,
        dev.len(),
        dev.keys().collect::<Vec<_>>()
    );

    let manifest = manifest.with_dev_dependencies(dev);
    if only_dev {
        debug!("Dropping production dependencies");
        return Ok(manifest.with_dependencies(DependencyMap::new()));
    }
    Ok(manifest)
}
