// Repository pattern implementation, one trait per relation owner

pub mod post_repository;
pub mod post_tag_repository;
pub mod reaction_repository;
pub mod tag_repository;
pub mod user_repository;

pub use post_repository::PostRepository;
pub use post_tag_repository::PostTagRepository;
pub use reaction_repository::ReactionRepository;
pub use tag_repository::TagRepository;
pub use user_repository::UserRepository;
