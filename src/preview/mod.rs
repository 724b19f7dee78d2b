// Preview — captured artifact lifecycle and its object-URL registry.

pub mod artifact;
pub mod resource;
