use std::sync::Arc;

use tracing::info;

use crate::data::Repositories;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, CommentDraft};
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::pagination::{Page, Paginator};
use crate::domain::post::{Post, PostDraft};
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct GroupPosts {
    pub(crate) group: Group,
    pub(crate) page_obj: Page<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct AuthorPosts {
    pub(crate) author: User,
    pub(crate) page_obj: Page<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
    pub(crate) author_posts_count: i64,
}

pub(crate) struct BlogService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    paginator: Paginator,
}

impl BlogService {
    pub(crate) fn new(repos: &Repositories, paginator: Paginator) -> Self {
        Self {
            users: repos.users.clone(),
            groups: repos.groups.clone(),
            posts: repos.posts.clone(),
            comments: repos.comments.clone(),
            paginator,
        }
    }

    pub(crate) async fn index(&self, page: Option<&str>) -> Result<Page<Post>, DomainError> {
        paginate_posts(self.posts.as_ref(), self.paginator, PostFilter::All, page).await
    }

    pub(crate) async fn group_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<GroupPosts, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("group '{slug}'")))?;
        let page_obj = paginate_posts(
            self.posts.as_ref(),
            self.paginator,
            PostFilter::Group(group.id),
            page,
        )
        .await?;

        Ok(GroupPosts { group, page_obj })
    }

    pub(crate) async fn author_posts(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<AuthorPosts, DomainError> {
        let author = find_author(self.users.as_ref(), username).await?;
        let page_obj = paginate_posts(
            self.posts.as_ref(),
            self.paginator,
            PostFilter::Author(author.id),
            page,
        )
        .await?;

        Ok(AuthorPosts { author, page_obj })
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("post id: {id}")))
    }

    pub(crate) async fn post_detail(&self, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.get_post(id).await?;
        let comments = self.comments.list_for_post(post.id).await?;
        let author_posts_count = self
            .posts
            .count_posts(PostFilter::Author(post.author.id))
            .await?;

        Ok(PostDetail {
            post,
            comments,
            author_posts_count,
        })
    }

    pub(crate) async fn groups(&self) -> Result<Vec<Group>, DomainError> {
        self.groups.list_groups().await
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        draft: PostDraft,
        image: Option<String>,
    ) -> Result<Post, DomainError> {
        let draft = self.validate_draft(draft).await?;

        let new_post = NewPost {
            text: draft.text,
            author_id,
            group_id: draft.group_id,
            image,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    /// Loads a post for editing; only its author gets it back.
    pub(crate) async fn post_for_edit(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<Post, DomainError> {
        let post = self.get_post(post_id).await?;
        if !post.is_authored_by(actor_user_id) {
            return Err(DomainError::NotAuthor);
        }
        Ok(post)
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        draft: PostDraft,
        image: Option<String>,
    ) -> Result<Post, DomainError> {
        // authorship is decided before the submitted fields are looked at
        self.post_for_edit(actor_user_id, post_id).await?;
        let draft = self.validate_draft(draft).await?;

        let patch = PostPatch {
            text: draft.text,
            group_id: draft.group_id,
            image,
        };
        let post = self
            .posts
            .update_post_owned(post_id, actor_user_id, patch)
            .await?
            .ok_or(DomainError::NotAuthor)?;
        info!(post_id, author_id = actor_user_id, "post updated");
        Ok(post)
    }

    pub(crate) async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        draft: CommentDraft,
    ) -> Result<Comment, DomainError> {
        let post = self.get_post(post_id).await?;
        let draft = draft.validate()?;

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: post.id,
                author_id,
                text: draft.text,
            })
            .await?;
        info!(post_id, comment_id = comment.id, author_id, "comment added");
        Ok(comment)
    }

    async fn validate_draft(&self, draft: PostDraft) -> Result<PostDraft, DomainError> {
        let draft = draft.validate()?;
        if let Some(group_id) = draft.group_id
            && self.groups.find_by_id(group_id).await?.is_none()
        {
            return Err(DomainError::Validation {
                field: "group",
                message: "select a valid choice",
            });
        }
        Ok(draft)
    }
}

pub(crate) async fn find_author(
    users: &dyn UserRepository,
    username: &str,
) -> Result<User, DomainError> {
    users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("user '{username}'")))
}

/// Counts, resolves the requested page and fetches its window.
pub(crate) async fn paginate_posts(
    posts: &dyn PostRepository,
    paginator: Paginator,
    filter: PostFilter,
    page: Option<&str>,
) -> Result<Page<Post>, DomainError> {
    let count = posts.count_posts(filter).await?;
    let window = paginator.resolve(page, count);
    let object_list = posts
        .list_posts(filter, Pagination::from(window))
        .await?;

    Ok(Page::new(window, object_list))
}
