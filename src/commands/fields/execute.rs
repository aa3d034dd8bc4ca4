use std::error::Error;

use super::output::FIELD_COLUMNS;
use super::{FieldsAction, FieldsCmd};
use crate::api::{self, Caller};
use crate::commands::{read_payload, Execute};
use crate::db::Datastore;
use crate::output::ApiOutput;

impl Execute for FieldsCmd {
    type Output = ApiOutput;

    fn execute(self, db: &dyn Datastore) -> Result<Self::Output, Box<dyn Error>> {
        let caller = Caller::admin();
        let response = match self.action {
            FieldsAction::List { collection, page } => {
                api::fields::list(db, collection.as_deref(), page.into())
            }
            FieldsAction::Get { collection, field } => api::fields::get(db, &collection, &field),
            FieldsAction::Create { collection, data } => {
                api::fields::create(db, caller, &collection, &read_payload(&data)?)
            }
            FieldsAction::Update {
                collection,
                field,
                data,
            } => api::fields::update(db, caller, &collection, &field, &read_payload(&data)?),
            FieldsAction::Delete { collection, field } => {
                api::fields::delete(db, caller, &collection, &field)
            }
        };
        Ok(ApiOutput::new(response, FIELD_COLUMNS))
    }
}
