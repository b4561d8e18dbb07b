use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, prelude::*};

use crate::{Event, ResultEngine};

mod events;
mod payments;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Load full aggregates for the given event rows, preserving their order.
async fn load_events<C>(
    db: &C,
    event_models: Vec<crate::events::Model>,
) -> ResultEngine<Vec<Event>>
where
    C: ConnectionTrait,
{
    if event_models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = event_models.iter().map(|model| model.id.clone()).collect();

    let mut participant_models = crate::participants::Entity::find()
        .filter(crate::participants::Column::EventId.is_in(ids.clone()))
        .order_by_asc(crate::participants::Column::Position)
        .all(db)
        .await?;
    let mut payment_models = crate::payments::Entity::find()
        .filter(crate::payments::Column::EventId.is_in(ids))
        .order_by_desc(crate::payments::Column::CreatedAt)
        .all(db)
        .await?;

    let mut out = Vec::with_capacity(event_models.len());
    for model in event_models {
        let (own_participants, rest): (Vec<_>, Vec<_>) = participant_models
            .into_iter()
            .partition(|participant| participant.event_id == model.id);
        participant_models = rest;
        let (own_payments, rest): (Vec<_>, Vec<_>) = payment_models
            .into_iter()
            .partition(|payment| payment.event_id == model.id);
        payment_models = rest;

        out.push(Event::from_rows(model, own_participants, own_payments)?);
    }
    Ok(out)
}

/// Load a single aggregate, `None` if the event does not exist.
async fn load_event<C>(db: &C, event_id: &str) -> ResultEngine<Option<Event>>
where
    C: ConnectionTrait,
{
    let Some(model) = crate::events::Entity::find_by_id(event_id.to_string())
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    Ok(load_events(db, vec![model]).await?.pop())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
