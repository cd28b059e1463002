mod analysis;
mod digest;
mod error;
mod extract;
mod midi_importer;
mod model;
mod record;
mod util;

#[cfg(test)]
mod test_util;

pub use analysis::*;
pub use digest::*;
pub use error::*;
pub use extract::*;
pub use midi_importer::*;
pub use model::config::*;
pub use model::pitch::*;
pub use model::score::*;
pub use record::*;
pub use util::*;
