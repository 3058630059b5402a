use tracing::debug;

use super::accessor::RecordAccessor;
use super::connection::ConnectionProvider;
use super::error::{DaoError, DaoResult, PersistenceContext};
use super::statement::{insert_returning_key, prepare_statement, SqlValue};
use crate::models::Room;

const INSERT_QUERY: &str = "INSERT INTO room (name, capacity, campus) VALUES (?, ?, ?)";
const LIST_QUERY: &str = "SELECT id, name, capacity, campus FROM room";
const FIND_BY_NAME_QUERY: &str = "SELECT id, name, capacity, campus FROM room WHERE name = ?";

/// Rooms have no associations, so every read is a single query.
#[derive(Debug, Clone)]
pub struct RoomDao<P> {
    provider: P,
}

impl<P: ConnectionProvider> RoomDao<P> {
    /// Build an accessor that asks `provider` for a connection per call.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

fn map_room(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        capacity: row.get(2)?,
        campus: row.get(3)?,
    })
}

impl<P: ConnectionProvider> RecordAccessor for RoomDao<P> {
    type Record = Room;

    const ENTITY: &'static str = "room";

    /// Reject an identified room or a zero capacity before touching the
    /// store, then insert and assign the id.
    fn create(&self, room: &mut Room) -> DaoResult<()> {
        if room.id.is_some() {
            return Err(DaoError::InvalidState("room id must be unset, it already exists"));
        }
        if room.capacity == 0 {
            return Err(DaoError::InvalidState("room capacity must be positive"));
        }

        let conn = self.provider.connection()?;
        let values = [
            SqlValue::from(room.name.as_str()),
            SqlValue::from(room.capacity),
            SqlValue::from(room.campus.as_str()),
        ];
        let id = insert_returning_key(&conn, INSERT_QUERY, &values, "create room")?;
        room.id = Some(id);
        debug!(id, name = %room.name, "created room");
        Ok(())
    }

    fn try_list(&self) -> DaoResult<Vec<Room>> {
        let conn = self.provider.connection()?;
        let action = "list rooms";
        let rooms = prepare_statement(&conn, LIST_QUERY, false, &[])
            .persistence(action)?
            .fetch_all(map_room)
            .persistence(action);
        rooms
    }

    /// Exact match on the room name, e.g. `KA-201`.
    fn try_find(&self, name: &str) -> DaoResult<Option<Room>> {
        let conn = self.provider.connection()?;
        let action = "find room";
        let room = prepare_statement(&conn, FIND_BY_NAME_QUERY, false, &[name.into()])
            .persistence(action)?
            .fetch_first(map_room)
            .persistence(action);
        room
    }
}
