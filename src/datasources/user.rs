//! `paperspace_user` data source

use super::Lookup;
use crate::schema::{AttrType, Attribute, Schema, Timeouts};

pub static SCHEMA: Schema = Schema {
    type_name: "paperspace_user",
    attributes: &[
        Attribute::optional_computed("id", AttrType::String),
        Attribute::optional_computed("email", AttrType::String),
        Attribute::optional_computed("firstname", AttrType::String),
        Attribute::optional_computed("lastname", AttrType::String),
        Attribute::optional_computed("dt_created", AttrType::String),
        Attribute::optional_computed("team_id", AttrType::String),
    ],
    timeouts: Timeouts::all(std::time::Duration::from_secs(60)),
};

pub static LOOKUP: Lookup = Lookup {
    schema: &SCHEMA,
    kind: "user",
    path: "/users/getUsers",
    fields: &[
        ("id", "id"),
        ("email", "email"),
        ("firstname", "firstname"),
        ("lastname", "lastname"),
        ("dt_created", "dtCreated"),
        ("team_id", "teamId"),
    ],
};
