// src/api/dto/common.rs

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::ValidationErrors;

/// 削除レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub object: String,
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(id: Uuid, object: &str) -> Self {
        Self {
            id,
            object: object.to_string(),
            deleted: true,
        }
    }
}

/// フィールドの「未指定」と「null」を区別するためのデシリアライザ
///
/// `#[serde(default, deserialize_with = "double_option")]` と組み合わせて使う。
/// 未指定 → `None`、`null` → `Some(None)`、値 → `Some(Some(v))`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// validator のエラーを "field: message" 形式の一覧に変換
pub fn validation_messages(validation_errors: &ValidationErrors) -> Vec<String> {
    let mut errors: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                format!(
                    "{}: {}",
                    field,
                    error
                        .message
                        .as_ref()
                        .map_or("Invalid value", |message| message.as_ref())
                )
            })
        })
        .collect();
    errors.sort();
    errors
}

/// 空白のみの値を未指定として扱う（値そのものはトリムしない）
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
