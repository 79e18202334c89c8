//! multipart/form-data ボディの型付きビルダー
//!
//! 送信前に各パートを検証する。境界文字列とContent-Typeヘッダは
//! トランスポート側で生成するため、ここでは扱わない。

use crate::error::{Error, Result};

/// フォームの1パート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub field_name: String,
    pub content: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl FormPart {
    fn validate(&self) -> Result<()> {
        if self.field_name.trim().is_empty() {
            return Err(Error::InvalidUpload("field name is empty".into()));
        }
        if self.content.is_empty() {
            return Err(Error::InvalidUpload(format!(
                "part '{}' has no content",
                self.field_name
            )));
        }
        if self.filename.trim().is_empty() {
            return Err(Error::InvalidUpload(format!(
                "part '{}' has no filename",
                self.field_name
            )));
        }
        if !is_valid_mime(&self.mime_type) {
            return Err(Error::InvalidUpload(format!(
                "invalid MIME type: {}",
                self.mime_type
            )));
        }
        Ok(())
    }
}

/// 検証済みのmultipartボディ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }
}

#[derive(Debug, Default)]
pub struct MultipartBuilder {
    parts: Vec<FormPart>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(
        mut self,
        field_name: impl Into<String>,
        content: Vec<u8>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        self.parts.push(FormPart {
            field_name: field_name.into(),
            content,
            mime_type: mime_type.into(),
            filename: filename.into(),
        });
        self
    }

    /// 全パートを検証してボディを確定
    pub fn build(self) -> Result<MultipartBody> {
        if self.parts.is_empty() {
            return Err(Error::InvalidUpload("no parts".into()));
        }
        for part in &self.parts {
            part.validate()?;
        }
        Ok(MultipartBody { parts: self.parts })
    }
}

/// "type/subtype" 形式か
fn is_valid_mime(mime: &str) -> bool {
    match mime.split_once('/') {
        Some((ty, sub)) => {
            let ok = |s: &str| {
                !s.is_empty()
                    && s.chars()
                        .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
            };
            ok(ty) && ok(sub)
        }
        None => false,
    }
}
