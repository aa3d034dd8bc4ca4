use std::error::Error;

use super::output::columns;
use super::{CollectionsAction, CollectionsCmd};
use crate::api::{self, Caller};
use crate::commands::{read_payload, Execute};
use crate::db::Datastore;
use crate::output::ApiOutput;

impl Execute for CollectionsCmd {
    type Output = ApiOutput;

    fn execute(self, db: &dyn Datastore) -> Result<Self::Output, Box<dyn Error>> {
        let columns = columns(&self.action);
        let caller = Caller::admin();
        let response = match self.action {
            CollectionsAction::List { page } => api::collections::list(db, page.into()),
            CollectionsAction::Get { name } => api::collections::get(db, &name),
            CollectionsAction::Describe { name } => api::collections::schema(db, &name),
            CollectionsAction::Create { data } => {
                api::collections::create(db, caller, &read_payload(&data)?)
            }
            CollectionsAction::Update { name, data } => {
                api::collections::update(db, caller, &name, &read_payload(&data)?)
            }
            CollectionsAction::Delete { name } => api::collections::delete(db, caller, &name),
        };
        Ok(ApiOutput::new(response, columns))
    }
}
