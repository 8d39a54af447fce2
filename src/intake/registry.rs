use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::Mutex as AsyncMutex;

use super::controller::Conversation;

const SWEEP_EVERY_SECS: u64 = 600; // 10 minutes
const MAX_IDLE_SECS: u64 = 24 * 60 * 60;
const STAGED_IDLE_SECS: u64 = 30 * 60;
/// Live conversations kept at once; the least recently seen goes first.
pub const MAX_LIVE_CONVERSATIONS: usize = 10_000;

pub type ConversationHandle = Arc<AsyncMutex<Conversation>>;

struct Slot {
    conversation: ConversationHandle,
    last_seen: Instant,
}

/// Live conversations keyed by session id. Each conversation sits behind its
/// own async mutex, so input for one browser is handled one request at a time.
#[derive(Clone)]
pub struct ConversationRegistry {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    capacity: usize,
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_LIVE_CONVERSATIONS)
    }
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// The live conversation for `session_id`, if there is one.
    pub fn get(&self, session_id: &str) -> Option<ConversationHandle> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.get_mut(session_id)?;
        slot.last_seen = Instant::now();
        Some(Arc::clone(&slot.conversation))
    }

    /// The conversation for `session_id`, built with `open` if there is none.
    pub fn checkout<F>(&self, session_id: &str, open: F) -> ConversationHandle
    where
        F: FnOnce() -> Conversation,
    {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if !slots.contains_key(session_id) {
            make_room(&mut slots, self.capacity);
        }
        let slot = slots.entry(session_id.to_string()).or_insert_with(|| Slot {
            conversation: Arc::new(AsyncMutex::new(open())),
            last_seen: Instant::now(),
        });
        slot.last_seen = Instant::now();
        Arc::clone(&slot.conversation)
    }

    /// Replace whatever is stored for the session.
    pub fn insert(&self, conversation: Conversation) -> ConversationHandle {
        let session_id = conversation.session_id().to_string();
        let handle = Arc::new(AsyncMutex::new(conversation));
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if !slots.contains_key(&session_id) {
            make_room(&mut slots, self.capacity);
        }
        slots.insert(
            session_id,
            Slot {
                conversation: Arc::clone(&handle),
                last_seen: Instant::now(),
            },
        );
        handle
    }

    pub fn remove(&self, session_id: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop conversations not touched for `max_idle`. Returns how many went.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let before = slots.len();
        let now = Instant::now();
        slots.retain(|_, slot| now.duration_since(slot.last_seen) < max_idle);
        before - slots.len()
    }

    /// Drop staged files of conversations not touched for `max_idle`, keeping
    /// the conversations. Ones busy with a request are left for the next pass.
    pub fn release_staged(&self, max_idle: Duration) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        slots
            .values()
            .filter(|slot| now.duration_since(slot.last_seen) >= max_idle)
            .filter(|slot| slot.conversation.try_lock().is_ok_and(|mut conv| conv.expire_staged()))
            .count()
    }
}

fn make_room(slots: &mut HashMap<String, Slot>, capacity: usize) {
    while slots.len() >= capacity {
        let Some(oldest) = slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_seen)
            .map(|(id, _)| id.clone())
        else {
            break;
        };
        slots.remove(&oldest);
        log::warn!("Conversation registry full, evicted session {oldest}");
    }
}

/// Periodically drop idle conversations and stale staged files.
pub fn spawn_sweeper(registry: ConversationRegistry) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_EVERY_SECS));
        loop {
            interval.tick().await;
            let dropped = registry.sweep_idle(Duration::from_secs(MAX_IDLE_SECS));
            if dropped > 0 {
                log::info!("Dropped {dropped} idle conversation(s), {} live", registry.len());
            }
            let released = registry.release_staged(Duration::from_secs(STAGED_IDLE_SECS));
            if released > 0 {
                log::info!("Released {released} stale staged attachment(s)");
            }
        }
    });
}
