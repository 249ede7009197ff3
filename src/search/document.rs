use serde::{Deserialize, Serialize};

use crate::storage::ArticleRecord;

/// 文章的搜索文档，`_id` 为文章 ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSearchDto {
    pub id: i32,
    pub article_title: String,
    pub article_content: String,
    pub is_delete: i32,
    pub status: i32,
}

impl From<ArticleRecord> for ArticleSearchDto {
    fn from(article: ArticleRecord) -> Self {
        Self {
            id: article.id,
            article_title: article.article_title,
            article_content: article.article_content,
            is_delete: article.is_delete,
            status: article.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let dto = ArticleSearchDto::from(ArticleRecord {
            id: 7,
            article_title: "Hello".to_string(),
            article_content: "body".to_string(),
            is_delete: 0,
            status: 1,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "articleTitle": "Hello",
                "articleContent": "body",
                "isDelete": 0,
                "status": 1
            })
        );
    }
}
