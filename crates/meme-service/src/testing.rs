//! In-memory fakes shared by the service tests

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meme_core::traits::{
    CorpusCache, CorpusQuery, MemeRepository, PublicationRepository, RepoResult, VoteRepository,
};
use meme_core::{
    Admission, ChatId, DomainError, DuplicateJudge, Engagement, GroupFeedback, HashRecord, Meme,
    MemeId, MemeKey, MessageId, NewMeme, Publication, PublishedFeedback, Signature, UserId,
    Verdict, Vote, VoteCounts, VoteOutcome, VoteToggle, VoteTransition,
};

use crate::services::{
    EngineSettings, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    SignatureProvider,
};
use crate::transport::Transport;

/// Stored meme created now
pub fn meme(id: i64, platform: &str, group: &str, likes: u64, reposts: u64, views: u64) -> Meme {
    Meme {
        id: MemeId::new(id),
        external_id: format!("ext-{id}"),
        group: group.to_string(),
        platform: platform.to_string(),
        pictures: vec![format!("https://img.test/{id}.jpg")],
        description: String::new(),
        likes,
        reposts,
        views,
        comments: 0,
        created_at: Utc::now(),
    }
}

/// Candidate with one picture from group `g1` of platform `vk`
pub fn candidate(external_id: &str, picture: &str, description: &str) -> NewMeme {
    NewMeme {
        key: MemeKey::new(external_id, "g1", "vk"),
        pictures: vec![picture.to_string()],
        description: description.to_string(),
        engagement: Engagement {
            likes: 10,
            reposts: 1,
            views: 100,
            comments: 0,
        },
        created_at: Utc::now(),
    }
}

pub fn context(
    store: &Arc<InMemoryStore>,
    signatures: Arc<FakeSignatures>,
    transport: Option<Arc<RecordingTransport>>,
) -> ServiceContext {
    ServiceContextBuilder::new()
        .meme_repo(store.clone())
        .publication_repo(store.clone())
        .vote_repo(store.clone())
        .corpus_cache(store.clone())
        .signatures(signatures)
        .transport(transport.map(|t| t as Arc<dyn Transport>))
        .settings(EngineSettings::default())
        .build()
        .expect("test context")
}

#[derive(Default)]
struct State {
    memes: Vec<Meme>,
    hashes: Vec<HashRecord>,
    publications: Vec<Publication>,
    votes: HashMap<(ChatId, MessageId, UserId), Vote>,
    applied_events: HashMap<String, DateTime<Utc>>,
    next_id: i64,
    fail_publication_writes: bool,
}

/// Every repository port over one mutex-guarded state. Also serves the
/// corpus uncached.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("store lock")
    }

    pub fn insert_meme(&self, meme: Meme) {
        let mut state = self.state();
        state.next_id = state.next_id.max(meme.id.into_inner());
        state.memes.push(meme);
    }

    pub fn meme_count(&self) -> usize {
        self.state().memes.len()
    }

    pub fn fail_publication_writes(&self) {
        self.state().fail_publication_writes = true;
    }

    /// Backdate an applied vote event
    pub fn age_event(&self, event_id: &str, age: chrono::Duration) {
        if let Some(applied_at) = self.state().applied_events.get_mut(event_id) {
            *applied_at -= age;
        }
    }
}

fn tally(votes: &HashMap<(ChatId, MessageId, UserId), Vote>, chat_id: ChatId, message_id: MessageId) -> VoteCounts {
    votes
        .values()
        .filter(|v| v.chat_id == chat_id && v.message_id == message_id)
        .fold(VoteCounts::default(), |mut counts, vote| {
            match vote.choice {
                meme_core::Choice::Approve => counts.approve += 1,
                meme_core::Choice::Disapprove => counts.disapprove += 1,
            }
            counts
        })
}

#[async_trait]
impl MemeRepository for InMemoryStore {
    async fn find_by_id(&self, id: MemeId) -> RepoResult<Option<Meme>> {
        Ok(self.state().memes.iter().find(|m| m.id == id).cloned())
    }

    async fn find_id_by_key(&self, key: &MemeKey) -> RepoResult<Option<MemeId>> {
        Ok(self
            .state()
            .memes
            .iter()
            .find(|m| &m.key() == key)
            .map(|m| m.id))
    }

    async fn admit(
        &self,
        candidate: &NewMeme,
        signature: &Signature,
        judge: DuplicateJudge,
    ) -> RepoResult<Admission> {
        let mut state = self.state();
        if let Some(existing) = state.memes.iter().find(|m| m.key() == candidate.key) {
            return Ok(Admission::AlreadyStored { meme_id: existing.id });
        }

        match judge.judge(signature, &candidate.description, &state.hashes) {
            Verdict::Reject {
                duplicate_of,
                distance,
            } => Ok(Admission::Duplicate {
                duplicate_of,
                distance,
            }),
            Verdict::Admit { caption_variants } => {
                state.next_id += 1;
                let meme = Meme::from_candidate(MemeId::new(state.next_id), candidate);
                state.hashes.push(HashRecord::new(
                    meme.id,
                    signature.clone(),
                    candidate.description.clone(),
                ));
                state.memes.push(meme.clone());
                Ok(Admission::Admitted {
                    meme,
                    caption_variants,
                })
            }
        }
    }

    async fn find_all(&self) -> RepoResult<Vec<Meme>> {
        Ok(self.state().memes.clone())
    }

    async fn find_page(&self, query: CorpusQuery) -> RepoResult<Vec<Meme>> {
        let after = query.after.map_or(i64::MIN, MemeId::into_inner);
        let mut memes: Vec<Meme> = self
            .state()
            .memes
            .iter()
            .filter(|m| query.since.map_or(true, |since| m.created_at >= since))
            .filter(|m| m.id.into_inner() > after)
            .cloned()
            .collect();
        memes.sort_by_key(|m| m.id.into_inner());
        memes.truncate(usize::try_from(query.limit).unwrap_or(0));
        Ok(memes)
    }

    async fn find_unpublished(&self, chat_id: ChatId, since: DateTime<Utc>) -> RepoResult<Vec<Meme>> {
        let state = self.state();
        let mut memes: Vec<Meme> = state
            .memes
            .iter()
            .filter(|m| m.created_at >= since)
            .filter(|m| {
                !state
                    .publications
                    .iter()
                    .any(|p| p.chat_id == chat_id && p.meme_id == m.id)
            })
            .cloned()
            .collect();
        memes.sort_by_key(|m| (m.created_at, m.id));
        Ok(memes)
    }
}

#[async_trait]
impl PublicationRepository for InMemoryStore {
    async fn record(&self, publication: &Publication) -> RepoResult<bool> {
        let mut state = self.state();
        if state.fail_publication_writes {
            return Err(DomainError::DatabaseError("publications unavailable".into()));
        }
        if state
            .publications
            .iter()
            .any(|p| p.chat_id == publication.chat_id && p.meme_id == publication.meme_id)
        {
            return Ok(false);
        }
        state.publications.push(publication.clone());
        Ok(true)
    }

    async fn is_published(&self, chat_id: ChatId, meme_id: MemeId) -> RepoResult<bool> {
        Ok(self
            .state()
            .publications
            .iter()
            .any(|p| p.chat_id == chat_id && p.meme_id == meme_id))
    }

    async fn feedback_by_group(&self) -> RepoResult<Vec<GroupFeedback>> {
        let state = self.state();
        let mut buckets: BTreeMap<(String, String), (u64, u64)> = BTreeMap::new();
        for publication in &state.publications {
            let Some(meme) = state.memes.iter().find(|m| m.id == publication.meme_id) else {
                continue;
            };
            let counts = tally(&state.votes, publication.chat_id, publication.message_id);
            let bucket = buckets
                .entry((meme.platform.clone(), meme.group.clone()))
                .or_default();
            bucket.0 += counts.approve;
            bucket.1 += counts.disapprove;
        }

        Ok(buckets
            .into_iter()
            .map(|((platform, group), (likes, dislikes))| GroupFeedback {
                platform,
                group,
                likes,
                dislikes,
            })
            .collect())
    }

    async fn published_feedback(&self, chat_id: ChatId) -> RepoResult<Vec<PublishedFeedback>> {
        let state = self.state();
        Ok(state
            .publications
            .iter()
            .filter(|p| p.chat_id == chat_id)
            .filter_map(|p| {
                let meme = state.memes.iter().find(|m| m.id == p.meme_id)?.clone();
                let counts = tally(&state.votes, p.chat_id, p.message_id);
                Some(PublishedFeedback {
                    meme,
                    message_id: p.message_id,
                    likes: counts.approve,
                    dislikes: counts.disapprove,
                })
            })
            .collect())
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn toggle(&self, toggle: &VoteToggle) -> RepoResult<VoteOutcome> {
        let mut state = self.state();
        if let Some(event_id) = &toggle.event_id {
            if state.applied_events.contains_key(event_id) {
                return Ok(VoteOutcome::Duplicate);
            }
            state.applied_events.insert(event_id.clone(), Utc::now());
        }

        let key = (toggle.chat_id, toggle.message_id, toggle.user_id);
        let existing = state.votes.get(&key).map(|v| v.choice);
        let transition = VoteTransition::resolve(existing, toggle.choice);
        match transition {
            VoteTransition::Insert(choice) | VoteTransition::Update(choice) => {
                state.votes.insert(
                    key,
                    Vote {
                        chat_id: toggle.chat_id,
                        message_id: toggle.message_id,
                        user_id: toggle.user_id,
                        choice,
                        updated_at: Utc::now(),
                    },
                );
            }
            VoteTransition::Delete => {
                state.votes.remove(&key);
            }
        }
        Ok(transition.outcome())
    }

    async fn counts(&self, chat_id: ChatId, message_id: MessageId) -> RepoResult<VoteCounts> {
        Ok(tally(&self.state().votes, chat_id, message_id))
    }

    async fn find(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        user_id: UserId,
    ) -> RepoResult<Option<Vote>> {
        Ok(self.state().votes.get(&(chat_id, message_id, user_id)).cloned())
    }

    async fn prune_events(&self, applied_before: DateTime<Utc>) -> RepoResult<u64> {
        let mut state = self.state();
        let before = state.applied_events.len();
        state.applied_events.retain(|_, applied_at| *applied_at >= applied_before);
        Ok((before - state.applied_events.len()) as u64)
    }
}

#[async_trait]
impl CorpusCache for InMemoryStore {
    async fn corpus(&self) -> RepoResult<Arc<Vec<Meme>>> {
        Ok(Arc::new(self.state().memes.clone()))
    }
}

/// Publication repository whose reaction totals cannot be read
pub struct FailingFeedback;

#[async_trait]
impl PublicationRepository for FailingFeedback {
    async fn record(&self, _publication: &Publication) -> RepoResult<bool> {
        Ok(true)
    }

    async fn is_published(&self, _chat_id: ChatId, _meme_id: MemeId) -> RepoResult<bool> {
        Ok(false)
    }

    async fn feedback_by_group(&self) -> RepoResult<Vec<GroupFeedback>> {
        Err(DomainError::DatabaseError("connection reset".into()))
    }

    async fn published_feedback(&self, _chat_id: ChatId) -> RepoResult<Vec<PublishedFeedback>> {
        Ok(Vec::new())
    }
}

/// Longer than any timeout the tests configure
const STALL: Duration = Duration::from_secs(3600);

/// Signature provider backed by a table of picture hashes. Unknown
/// pictures fail as unreachable; stalled pictures never finish downloading.
#[derive(Default)]
pub struct FakeSignatures {
    hashes: HashMap<String, u64>,
    stalled: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeSignatures {
    pub fn with(mut self, picture: &str, hash: u64) -> Self {
        self.hashes.insert(picture.to_string(), hash);
        self
    }

    pub fn stalled(mut self, picture: &str) -> Self {
        self.stalled.insert(picture.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureProvider for FakeSignatures {
    async fn signature(&self, pictures: &[String]) -> ServiceResult<Signature> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if pictures.iter().any(|p| self.stalled.contains(p)) {
            tokio::time::sleep(STALL).await;
        }
        let hashes = pictures
            .iter()
            .map(|p| {
                self.hashes
                    .get(p)
                    .copied()
                    .ok_or_else(|| ServiceError::transient(format!("fetching {p}: unreachable")))
            })
            .collect::<ServiceResult<Vec<_>>>()?;
        Ok(Signature::new(hashes))
    }
}

/// Transport answering with consecutive message ids. A stalled transport
/// only answers after [`STALL`].
pub struct RecordingTransport {
    next_message_id: AtomicI64,
    deliveries: Mutex<Vec<(ChatId, MemeId)>>,
    stalled: bool,
}

impl RecordingTransport {
    pub fn new(first_message_id: MessageId) -> Self {
        Self {
            next_message_id: AtomicI64::new(first_message_id),
            deliveries: Mutex::new(Vec::new()),
            stalled: false,
        }
    }

    pub fn stalled(first_message_id: MessageId) -> Self {
        Self {
            stalled: true,
            ..Self::new(first_message_id)
        }
    }

    pub fn deliveries(&self) -> Vec<(ChatId, MemeId)> {
        self.deliveries.lock().expect("deliveries lock").clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(
        &self,
        chat_id: ChatId,
        meme: &Meme,
        _breakdown: &meme_core::ScoreBreakdown,
    ) -> ServiceResult<MessageId> {
        if self.stalled {
            tokio::time::sleep(STALL).await;
        }
        self.deliveries
            .lock()
            .expect("deliveries lock")
            .push((chat_id, meme.id));
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }
}
