//! Members and librarians service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{Checkout, CreateLibrarian, CreateMember, Librarian, Member},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_member(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    pub async fn find_member_by_identity(&self, identity_ref: &str) -> AppResult<Option<Member>> {
        self.repository.members.get_by_identity(identity_ref).await
    }

    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    pub async fn create_member(&self, member: CreateMember) -> AppResult<Member> {
        member.validate()?;
        let member = self.repository.members.create(&member).await?;
        tracing::info!(member_id = member.id, "Member registered");
        Ok(member)
    }

    /// Books a member currently holds
    pub async fn active_checkouts(&self, member_id: i32) -> AppResult<Vec<Checkout>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.checkouts.list_active_for_member(member_id).await
    }

    pub async fn get_librarian(&self, id: i32) -> AppResult<Librarian> {
        self.repository.librarians.get_by_id(id).await
    }

    pub async fn list_librarians(&self) -> AppResult<Vec<Librarian>> {
        self.repository.librarians.list().await
    }

    pub async fn create_librarian(&self, librarian: CreateLibrarian) -> AppResult<Librarian> {
        librarian.validate()?;
        let librarian = self.repository.librarians.create(&librarian).await?;
        tracing::info!(librarian_id = librarian.id, "Librarian registered");
        Ok(librarian)
    }
}
