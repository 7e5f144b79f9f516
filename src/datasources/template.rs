//! `paperspace_template` data source

use super::Lookup;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_template",
    attributes: &[
        Attribute::optional_computed("id", AttrType::String),
        Attribute::optional_computed("name", AttrType::String),
        Attribute::optional_computed("label", AttrType::String),
        Attribute::optional_computed("os", AttrType::String),
        Attribute::optional_computed("dt_created", AttrType::String),
        Attribute::optional_computed("team_id", AttrType::String),
        Attribute::optional_computed("user_id", AttrType::String),
        Attribute::optional_computed("region", AttrType::String),
    ],
    timeouts: Timeouts::all(std::time::Duration::from_secs(60)),
};

pub static LOOKUP: Lookup = Lookup {
    schema: &SCHEMA,
    kind: "template",
    path: "/templates/getTemplates",
    fields: &[
        ("id", "id"),
        ("name", "name"),
        ("label", "label"),
        ("os", "os"),
        ("dt_created", "dtCreated"),
        ("team_id", "teamId"),
        ("user_id", "userId"),
        ("region", "region"),
    ],
};
