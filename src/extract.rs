//! PDF Text Extraction
//!
//! 저장된 PDF 파일에서 페이지 순서대로 텍스트를 뽑아낸다.
//! PDF 파서는 `pdf` feature 로만 포함된다.

use std::path::Path;

use crate::error::StudyError;

/// 페이지별 텍스트를 줄바꿈으로 이어붙이고 앞뒤 공백을 정리한다.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .map(|page| page.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// PDF 전체 텍스트 추출
#[cfg(feature = "pdf")]
pub fn extract_text_from_pdf(path: &Path) -> Result<String, StudyError> {
    // pdf-extract 는 손상된 파일에서 panic 할 수 있으므로 에러로 변환한다.
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path));

    match result {
        Ok(Ok(pages)) => Ok(join_pages(pages)),
        Ok(Err(e)) => Err(StudyError::ExtractionFailed(e.to_string())),
        Err(panic) => {
            let cause = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "PDF parser panicked".to_string());
            Err(StudyError::ExtractionFailed(cause))
        }
    }
}

/// PDF 전체 텍스트 추출 (PDF 기능 미포함 빌드)
#[cfg(not(feature = "pdf"))]
pub fn extract_text_from_pdf(_path: &Path) -> Result<String, StudyError> {
    Err(StudyError::ExtractionUnavailable)
}

/// 테스트용: 페이지마다 한 줄씩 적힌 최소 PDF 를 만든다 (xref 오프셋 포함)
#[cfg(all(test, feature = "pdf"))]
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        let stream = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", text);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        tail.push_str(&format!("{:010} 00000 n \n", offset));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    out.extend_from_slice(tail.as_bytes());
    out
}
