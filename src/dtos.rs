use crate::models::{Comment, Platform, Post, PostContent, Reaction, User, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// DTOs define the JSON exchanged with clients, kept apart from the row models.
// Post, comment and reaction fields keep the Spanish names the clients use.

// ============================================================================
// Authentication DTOs
// ============================================================================

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignupUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(
        min = 6,
        max = 64,
        message = "Password must be between 6 and 64 characters"
    ))]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login success response with JWT token (also set as the `access_token` cookie)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
}

/// Generic success response
#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

// ============================================================================
// Pagination & Query DTOs
// ============================================================================

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Serialize, Deserialize, Validate, Debug, Default)]
pub struct RequestQueryDto {
    #[validate(range(min = 1, message = "Page must be greater than 0"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 50, message = "Limit must be between 1 and 50"))]
    pub limit: Option<u32>,
}

impl RequestQueryDto {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationDto {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl PaginationDto {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i64 = limit.max(1) as i64;
        PaginationDto {
            page,
            limit,
            total,
            total_pages: (total + limit_i64 - 1) / limit_i64,
        }
    }
}

// ============================================================================
// User DTOs
// ============================================================================

/// User data sent to clients, without the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn filter_users(user: &[User]) -> Vec<FilterUserDto> {
        user.iter().map(FilterUserDto::filter_user).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

/// Caller's profile with the ids of their posts
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMeData {
    pub user: FilterUserDto,
    pub publicaciones: Vec<Uuid>,
    pub post_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserMeResponseDto {
    pub status: String,
    pub data: UserMeData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponseDto {
    pub status: String,
    pub users: Vec<FilterUserDto>,
    pub results: i64,
}

/// Admin update; absent fields are left unchanged
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    pub role: Option<UserRole>,
}

// ============================================================================
// Post DTOs
// ============================================================================

/// Post creation/update request (used for both POST and PUT)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostInputDto {
    #[serde(rename = "nombreJuego")]
    #[validate(length(min = 1, message = "Game name is required."))]
    pub game_name: String,

    #[serde(rename = "trofeosLogros")]
    #[validate(length(min = 1, message = "At least one trophy or achievement is required."))]
    pub trophies: Vec<String>,

    #[serde(rename = "duracion")]
    #[validate(length(min = 1, message = "Duration is required."))]
    pub duration: String,

    #[serde(rename = "dificultad")]
    #[validate(length(min = 1, message = "Difficulty is required."))]
    pub difficulty: String,

    #[serde(rename = "contenido")]
    #[validate(length(min = 1, message = "Content is required."))]
    pub content: String,

    #[serde(rename = "plataforma")]
    pub platform: Platform,
}

impl From<PostInputDto> for PostContent {
    fn from(dto: PostInputDto) -> Self {
        PostContent {
            game_name: dto.game_name.trim().to_string(),
            trophies: dto.trophies.iter().map(|t| t.trim().to_string()).collect(),
            duration: dto.duration.trim().to_string(),
            difficulty: dto.difficulty.trim().to_string(),
            content: dto.content,
            platform: dto.platform,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponseDto {
    pub status: String,
    pub data: Post,
}

#[derive(Debug, Serialize)]
pub struct PostListResponseDto {
    pub status: String,
    pub results: usize,
    pub data: Vec<Post>,
    pub pagination: PaginationDto,
}

// ============================================================================
// Comment DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CommentInputDto {
    #[serde(rename = "comentario")]
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub content: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentsQueryDto {
    #[validate(custom(function = "validate_sort"))]
    pub sort: Option<String>, // created_at_desc or created_at_asc
}

impl CommentsQueryDto {
    pub fn ascending(&self) -> bool {
        self.sort.as_deref() == Some("created_at_asc")
    }
}

/// Custom validator for sort parameter
fn validate_sort(sort: &String) -> Result<(), validator::ValidationError> {
    if sort == "created_at_desc" || sort == "created_at_asc" {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_sort"))
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponseDto {
    pub status: String,
    pub data: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponseDto {
    pub status: String,
    pub results: usize,
    pub data: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationDto>,
}

// ============================================================================
// Reaction DTOs
// ============================================================================

/// The kind is checked against the allowed labels by the reaction service
#[derive(Debug, Deserialize, Validate)]
pub struct ReactionInputDto {
    #[serde(rename = "tipoReaccion")]
    #[validate(length(min = 1, message = "Reaction kind is required"))]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ReactionsResponseDto {
    pub status: String,
    pub message: String,
    pub reacciones: Vec<Reaction>,
}

// ============================================================================
// Chat DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequestDto {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseDto {
    pub status: String,
    pub response: String,
}

/// Gemini `generateContent` request body
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
pub struct GeminiPart {
    pub text: String,
}
