use std::error::Error;

use super::output::ITEM_COLUMNS;
use super::{ItemsAction, ItemsCmd};
use crate::api::{self, Caller};
use crate::commands::{read_payload, Execute};
use crate::db::Datastore;
use crate::output::ApiOutput;

impl Execute for ItemsCmd {
    type Output = ApiOutput;

    fn execute(self, db: &dyn Datastore) -> Result<Self::Output, Box<dyn Error>> {
        let caller = Caller::admin();
        let response = match self.action {
            ItemsAction::List { collection, page } => api::items::list(db, &collection, page.into()),
            ItemsAction::Get { collection, id } => api::items::get(db, &collection, &id),
            ItemsAction::Create { collection, data } => {
                api::items::create(db, caller, &collection, &read_payload(&data)?)
            }
            ItemsAction::Update {
                collection,
                id,
                data,
            } => api::items::update(db, caller, &collection, &id, &read_payload(&data)?),
            ItemsAction::Delete { collection, id } => {
                api::items::delete(db, caller, &collection, &id)
            }
        };
        Ok(ApiOutput::new(response, ITEM_COLUMNS))
    }
}
