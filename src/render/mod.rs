pub(crate) mod blend;
pub(crate) mod compositor;
pub(crate) mod plan;
pub(crate) mod raster;
pub(crate) mod settings;
