// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Write simulated radio-interferometer visibilities into measurement-set tables.

Blocks of visibilities ([`VisBlock`]) are remapped from their
(time, channel, baseline) layout into measurement-set rows by
[`io::write::write_vis_block`], stored through the [`table::Table`] interface
by a [`ms::MeasurementSet`], and read back with [`io::read::get_column`].
 */

pub mod cli;
pub mod constants;
pub mod io;
mod jones;
pub mod math;
pub mod ms;
pub mod params;
pub mod table;
pub mod vis_block;

// Re-exports.
pub use cli::{Vistable, VistableError};
pub use jones::{c32, c64, Jones};
pub use ms::{MeasurementSet, MsCreateParams, MsError};
pub use vis_block::{VisBlock, VisBlockDims, VisFloat, Visibility};
