use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::QueryResult;

/// A whole loaded annotation document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSet {
    pub queries: Vec<QueryResult>,
    pub timestamp: DateTime<Utc>,
    pub model_info: BTreeMap<String, String>,
    pub video_path: Option<String>,
    pub total_queries: Option<usize>,
}

impl AnnotationSet {
    pub fn new(queries: Vec<QueryResult>) -> Self {
        Self {
            queries,
            timestamp: Utc::now(),
            model_info: BTreeMap::new(),
            video_path: None,
            total_queries: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn query(&self, index: usize) -> Option<&QueryResult> {
        self.queries.get(index)
    }

    pub fn query_mut(&mut self, index: usize) -> Option<&mut QueryResult> {
        self.queries.get_mut(index)
    }

    pub fn results_for_video<'a>(
        &'a self,
        video_id: &'a str,
    ) -> impl Iterator<Item = &'a QueryResult> + 'a {
        self.queries
            .iter()
            .filter(move |query| query.video_id == video_id)
    }

    pub fn interval_count(&self) -> usize {
        self.queries.iter().map(|query| query.intervals().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interval;

    #[test]
    fn test_results_for_video() {
        let set = AnnotationSet::new(vec![
            QueryResult::new(Some(0), "a", "vid_a", Vec::new(), Vec::new()),
            QueryResult::new(Some(1), "b", "vid_b", Vec::new(), Vec::new()),
            QueryResult::new(Some(2), "c", "vid_a", Vec::new(), Vec::new()),
        ]);

        let ids: Vec<Option<i64>> = set.results_for_video("vid_a").map(|q| q.query_id).collect();
        assert_eq!(ids, vec![Some(0), Some(2)]);
        assert_eq!(set.results_for_video("missing").count(), 0);
    }

    #[test]
    fn test_interval_count() {
        let set = AnnotationSet::new(vec![
            QueryResult::new(
                Some(0),
                "a",
                "v",
                vec![
                    Interval::new(0.0, 1.0, 0.5).unwrap(),
                    Interval::new(2.0, 3.0, 0.7).unwrap(),
                ],
                Vec::new(),
            ),
            QueryResult::new(Some(1), "b", "v", Vec::new(), Vec::new()),
        ]);
        assert_eq!(set.interval_count(), 2);
        assert!(!set.is_empty());
    }
}
