//! In-process implementation of every repository trait, used by service and
//! router tests in place of Postgres.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::Repositories;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{AuthorRef, GroupRef, Post};
use crate::domain::user::User;

#[derive(Debug, Clone)]
struct PostRecord {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    tick: i64,
    users: Vec<UserCredentials>,
    groups: Vec<Group>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    follows: Vec<(i64, i64)>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so "newest first" is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        DateTime::from_timestamp(1_700_000_000 + self.tick, 0).expect("timestamp in range")
    }

    fn author_ref(&self, user_id: i64) -> Result<AuthorRef, DomainError> {
        self.users
            .iter()
            .find(|creds| creds.user.id == user_id)
            .map(|creds| AuthorRef {
                id: creds.user.id,
                username: creds.user.username.clone(),
            })
            .ok_or_else(|| DomainError::not_found("author"))
    }

    fn group_ref(&self, group_id: Option<i64>) -> Result<Option<GroupRef>, DomainError> {
        let Some(group_id) = group_id else {
            return Ok(None);
        };
        self.groups
            .iter()
            .find(|group| group.id == group_id)
            .map(|group| {
                Some(GroupRef {
                    id: group.id,
                    title: group.title.clone(),
                    slug: group.slug.clone(),
                })
            })
            .ok_or_else(|| DomainError::not_found("group"))
    }

    fn to_post(&self, record: &PostRecord) -> Result<Post, DomainError> {
        Post::new(
            record.id,
            record.text.clone(),
            record.pub_date,
            self.author_ref(record.author_id)?,
            self.group_ref(record.group_id)?,
            record.image.clone(),
        )
    }

    fn matches(&self, record: &PostRecord, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => record.group_id == Some(group_id),
            PostFilter::Author(author_id) => record.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|&(follower, author)| follower == user_id && author == record.author_id),
        }
    }

    fn sorted_posts(&self, filter: PostFilter) -> Vec<&PostRecord> {
        let mut posts: Vec<&PostRecord> = self
            .posts
            .iter()
            .filter(|record| self.matches(record, filter))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            groups: Arc::new(self.clone()),
            posts: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
            follows: Arc::new(self.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store mutex poisoned")
    }

    pub(crate) fn add_user(&self, username: &str) -> User {
        self.add_user_with_hash(username, "not-a-real-hash")
    }

    pub(crate) fn add_user_with_hash(&self, username: &str, password_hash: &str) -> User {
        let mut state = self.lock();
        let id = state.next_id();
        let created_at = state.now();
        let user = User::new(id, username, format!("{username}@example.com"), created_at)
            .expect("test user must be valid");
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        user
    }

    pub(crate) fn add_group(&self, title: &str, slug: &str) -> Group {
        let mut state = self.lock();
        let id = state.next_id();
        let group = Group::new(id, title, slug, format!("{title} description"))
            .expect("test group must be valid");
        state.groups.push(group.clone());
        group
    }

    pub(crate) fn add_post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        let mut state = self.lock();
        let id = state.next_id();
        let record = PostRecord {
            id,
            text: text.to_string(),
            pub_date: state.now(),
            author_id: author.id,
            group_id: group.map(|group| group.id),
            image: None,
        };
        let post = state.to_post(&record).expect("test post must be valid");
        state.posts.push(record);
        post
    }

    pub(crate) fn remove_post(&self, post_id: i64) {
        let mut state = self.lock();
        state.posts.retain(|record| record.id != post_id);
        state.comments.retain(|record| record.post_id != post_id);
    }

    pub(crate) fn post(&self, post_id: i64) -> Option<Post> {
        let state = self.lock();
        state
            .posts
            .iter()
            .find(|record| record.id == post_id)
            .map(|record| state.to_post(record).expect("stored post must be valid"))
    }

    pub(crate) fn all_posts(&self) -> Vec<Post> {
        let state = self.lock();
        state
            .sorted_posts(PostFilter::All)
            .into_iter()
            .map(|record| state.to_post(record).expect("stored post must be valid"))
            .collect()
    }

    pub(crate) fn comment_count(&self, post_id: i64) -> usize {
        self.lock()
            .comments
            .iter()
            .filter(|record| record.post_id == post_id)
            .count()
    }

    pub(crate) fn follow_edges(&self, user_id: i64, author_id: i64) -> usize {
        self.lock()
            .follows
            .iter()
            .filter(|&&edge| edge == (user_id, author_id))
            .count()
    }

    pub(crate) fn add_follow(&self, user: &User, author: &User) {
        self.lock().follows.push((user.id, author.id));
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|creds| creds.user.username == input.username)
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        let id = state.next_id();
        let created_at = state.now();
        let user = User::new(id, input.username, input.email, created_at)?;
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .map(|creds| creds.user.clone()))
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        Ok(self
            .lock()
            .groups
            .iter()
            .find(|group| group.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        Ok(self
            .lock()
            .groups
            .iter()
            .find(|group| group.id == id)
            .cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        let mut groups = self.lock().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        state.author_ref(input.author_id)?;
        state.group_ref(input.group_id)?;
        let id = state.next_id();
        let record = PostRecord {
            id,
            text: input.text,
            pub_date: state.now(),
            author_id: input.author_id,
            group_id: input.group_id,
            image: input.image,
        };
        let post = state.to_post(&record)?;
        state.posts.push(record);
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.lock();
        state
            .posts
            .iter()
            .find(|record| record.id == id)
            .map(|record| state.to_post(record))
            .transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        state.group_ref(patch.group_id)?;
        let Some(index) = state
            .posts
            .iter()
            .position(|record| record.id == post_id && record.author_id == owner_id)
        else {
            return Ok(None);
        };

        let record = &mut state.posts[index];
        record.text = patch.text;
        record.group_id = patch.group_id;
        if let Some(image) = patch.image {
            record.image = Some(image);
        }
        let record = record.clone();
        state.to_post(&record).map(Some)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let state = self.lock();
        let offset = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(0);
        state
            .sorted_posts(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| state.to_post(record))
            .collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let state = self.lock();
        Ok(state.sorted_posts(filter).len() as i64)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.iter().any(|record| record.id == input.post_id) {
            return Err(DomainError::not_found("post"));
        }
        let author = state.author_ref(input.author_id)?;
        let id = state.next_id();
        let created = state.now();
        state.comments.push(CommentRecord {
            id,
            post_id: input.post_id,
            author_id: input.author_id,
            text: input.text.clone(),
            created,
        });
        Comment::new(id, input.post_id, author, input.text, created)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let state = self.lock();
        let mut records: Vec<&CommentRecord> = state
            .comments
            .iter()
            .filter(|record| record.post_id == post_id)
            .collect();
        records.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        records
            .into_iter()
            .map(|record| {
                Comment::new(
                    record.id,
                    record.post_id,
                    state.author_ref(record.author_id)?,
                    record.text.clone(),
                    record.created,
                )
            })
            .collect()
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn follow(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if user_id == author_id {
            return Err(DomainError::Validation {
                field: "author",
                message: "users cannot follow themselves",
            });
        }
        if state.follows.contains(&(user_id, author_id)) {
            return Ok(false);
        }
        state.follows.push((user_id, author_id));
        Ok(true)
    }

    async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.follows.len();
        state
            .follows
            .retain(|&edge| edge != (user_id, author_id));
        Ok(state.follows.len() != before)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        Ok(self.lock().follows.contains(&(user_id, author_id)))
    }
}
