// selector.rs — 从候选壁纸中挑选最佳的一张
//
// 规则：先按热度筛选（相对第一名 > 0.75），再在入选者中比较标题里标注的分辨率。

use crate::error::{Error, Result};
use crate::source::Candidate;
use regex::Regex;
use std::sync::LazyLock;

/// 相对热度必须严格大于该阈值才参与分辨率比较
const POPULARITY_THRESHOLD: f64 = 0.75;

/// 匹配标题中的分辨率标注，如 "[3840x2160]"、"(1920 * 1080)"、"{2560X1440}"
static RESOLUTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[\(\{](\d+)[\sxX\*]+(\d+)[\)\}\]]").expect("resolution pattern is valid")
});

/// 从标题解析出的分辨率
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u64,
    pub height: u64,
}

impl Resolution {
    pub fn pixels(&self) -> u64 {
        self.width.saturating_mul(self.height)
    }
}

/// 最终选中的壁纸，必定来自输入的某一个候选
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub url: String,
}

/// 解析标题中第一个分辨率标注，没有则返回 None
pub fn parse_resolution(title: &str) -> Option<Resolution> {
    let caps = RESOLUTION_PATTERN.captures(title)?;
    // 超出 u64 的数字视为无法解析
    let width = caps[1].parse().ok()?;
    let height = caps[2].parse().ok()?;
    Some(Resolution { width, height })
}

fn pixel_count(candidate: &Candidate) -> u64 {
    parse_resolution(&candidate.title)
        .map(|r| r.pixels())
        .unwrap_or(0)
}

/// 挑选热度接近第一名且分辨率最高的候选
///
/// 第一个候选的热度作为基准，所以输入必须保持壁纸源给出的排序。
/// 分辨率相同时保留排序更靠前的那一个。
pub fn select_best(candidates: &[Candidate]) -> Result<Selection> {
    let first = candidates.first().ok_or(Error::EmptyInput)?;
    let baseline = first
        .popularity
        .filter(|p| p.is_finite())
        .ok_or(Error::MissingBaseline)?;
    if baseline <= 0.0 {
        return Err(Error::InvalidBaseline);
    }

    let mut best = 0;
    let mut best_pixels = pixel_count(first);

    for (i, candidate) in candidates.iter().enumerate() {
        let eligible = candidate
            .popularity
            .is_some_and(|p| p / baseline > POPULARITY_THRESHOLD);
        if !eligible {
            continue;
        }

        let pixels = pixel_count(candidate);
        if pixels > best_pixels {
            best = i;
            best_pixels = pixels;
        }
    }

    let chosen = &candidates[best];
    Ok(Selection {
        name: chosen.title.clone(),
        url: chosen.url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, popularity: f64) -> Candidate {
        Candidate {
            title: title.to_string(),
            popularity: Some(popularity),
            url: format!("https://i.example.com/{}.jpg", &title[..1]),
        }
    }

    #[test]
    fn single_candidate_is_selected() {
        let candidates = vec![candidate("A [1920x1080]", 100.0)];
        let selection = select_best(&candidates).unwrap();
        assert_eq!(selection.name, "A [1920x1080]");
        assert_eq!(selection.url, "https://i.example.com/A.jpg");
    }

    #[test]
    fn popular_enough_higher_resolution_wins() {
        let candidates = vec![
            candidate("A [1920x1080]", 100.0),
            candidate("B [3840x2160]", 90.0),
            candidate("C [4000x3000]", 50.0),
        ];
        let selection = select_best(&candidates).unwrap();
        assert_eq!(selection.name, "B [3840x2160]");
        assert_eq!(selection.url, "https://i.example.com/B.jpg");
    }

    #[test]
    fn unparsed_titles_fall_back_to_first() {
        let candidates = vec![
            candidate("A sunset", 100.0),
            candidate("B mountains", 99.0),
            candidate("C lake", 98.0),
        ];
        assert_eq!(select_best(&candidates).unwrap().name, "A sunset");
    }

    #[test]
    fn selection_is_repeatable() {
        let candidates = vec![
            candidate("A [1920x1080]", 100.0),
            candidate("B [2560x1440]", 80.0),
        ];
        assert_eq!(
            select_best(&candidates).unwrap(),
            select_best(&candidates).unwrap()
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(select_best(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn threshold_is_exclusive() {
        let candidates = vec![
            candidate("A [800x600]", 100.0),
            candidate("B [3840x2160]", 75.0),
        ];
        assert_eq!(select_best(&candidates).unwrap().name, "A [800x600]");

        let candidates = vec![
            candidate("A [800x600]", 100.0),
            candidate("B [3840x2160]", 76.0),
        ];
        assert_eq!(select_best(&candidates).unwrap().name, "B [3840x2160]");
    }

    #[test]
    fn equal_resolution_keeps_earlier_candidate() {
        let candidates = vec![
            candidate("A mountains", 100.0),
            candidate("B [1920x1080]", 95.0),
            candidate("C [1080x1920]", 90.0),
        ];
        assert_eq!(select_best(&candidates).unwrap().name, "B [1920x1080]");
    }

    #[test]
    fn zero_baseline_is_invalid() {
        let candidates = vec![candidate("A [1920x1080]", 0.0)];
        assert!(matches!(
            select_best(&candidates),
            Err(Error::InvalidBaseline)
        ));
    }

    #[test]
    fn missing_baseline_is_rejected() {
        let candidates = vec![Candidate {
            title: "A [1920x1080]".into(),
            popularity: None,
            url: "https://i.example.com/A.jpg".into(),
        }];
        assert!(matches!(
            select_best(&candidates),
            Err(Error::MissingBaseline)
        ));
    }

    #[test]
    fn candidate_without_score_never_competes() {
        let candidates = vec![
            candidate("A [1280x720]", 10.0),
            Candidate {
                title: "B [7680x4320]".into(),
                popularity: None,
                url: "https://i.example.com/B.jpg".into(),
            },
        ];
        assert_eq!(select_best(&candidates).unwrap().name, "A [1280x720]");
    }

    #[test]
    fn resolution_brackets_and_separators() {
        let expected = Some(Resolution {
            width: 3840,
            height: 2160,
        });
        assert_eq!(parse_resolution("Fjord [3840 x 2160]"), expected);
        assert_eq!(parse_resolution("Fjord (3840*2160)"), expected);
        assert_eq!(parse_resolution("Fjord {3840X2160}"), expected);
        assert_eq!(parse_resolution("Fjord [3840  *  2160) OC"), expected);
        assert_eq!(parse_resolution("Fjord 3840x2160"), None);
        assert_eq!(parse_resolution("Fjord [OC]"), None);
    }

    #[test]
    fn pixel_count_uses_first_match() {
        let r = parse_resolution("[1920x1080] remastered (3840x2160)").unwrap();
        assert_eq!(r.pixels(), 1920 * 1080);
    }
}
