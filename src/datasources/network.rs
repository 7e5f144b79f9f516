//! `paperspace_network` data source

use super::Lookup;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_network",
    attributes: &[
        Attribute::optional_computed("id", AttrType::String),
        Attribute::optional_computed("name", AttrType::String),
        Attribute::optional_computed("region", AttrType::String),
        Attribute::optional_computed("dt_created", AttrType::String),
        Attribute::optional_computed("network", AttrType::String),
        Attribute::optional_computed("netmask", AttrType::String),
        Attribute::optional_computed("team_id", AttrType::String),
    ],
    timeouts: Timeouts::all(std::time::Duration::from_secs(60)),
};

pub static LOOKUP: Lookup = Lookup {
    schema: &SCHEMA,
    kind: "network",
    path: "/networks/getNetworks",
    fields: &[
        ("id", "id"),
        ("name", "name"),
        ("region", "region"),
        ("dt_created", "dtCreated"),
        ("network", "network"),
        ("netmask", "netmask"),
        ("team_id", "teamId"),
    ],
};
