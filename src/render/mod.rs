pub(crate) mod compositor;
pub(crate) mod frame;
pub(crate) mod palette;
pub(crate) mod projection;
pub(crate) mod sprite;
