use crate::normalize::{clean_name, normalize_address};
use crate::similarity::similarity;
use center_dedup_service::dto::{
    CenterRecord, Confidence, DetectionReport, DetectionSummary, DuplicateGroup, DuplicateType,
};
use rustc_hash::{FxHashMap, FxHashSet};

pub const DEFAULT_MIN_SIMILARITY: u8 = 85;
pub const DEFAULT_MAX_RESULTS: usize = 50;

const EXACT_MATCH_REASON: &str = "Exact name match after removing common words";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionOptions {
    /// Minimum name or address similarity (inclusive) for a fuzzy match
    pub min_similarity: u8,
    /// Number of groups kept after sorting by similarity
    pub max_results: usize,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// A center paired with its normalized comparison keys.
struct Candidate<'a> {
    center: &'a CenterRecord,
    name: String,
    address: String,
}

impl<'a> Candidate<'a> {
    fn new(center: &'a CenterRecord) -> Self {
        Self {
            center,
            name: clean_name(center.name.as_deref()),
            address: normalize_address(center.address.as_deref()),
        }
    }

    fn name_similarity(&self, other: &Candidate) -> f64 {
        similarity(&self.name, &other.name)
    }

    fn address_similarity(&self, other: &Candidate) -> f64 {
        similarity(&self.address, &other.address)
    }

    fn matches(&self, other: &Candidate, min_similarity: f64) -> bool {
        let name_match = !self.name.is_empty()
            && !other.name.is_empty()
            && self.name_similarity(other) >= min_similarity;
        let address_match = !self.address.is_empty()
            && !other.address.is_empty()
            && self.address_similarity(other) >= min_similarity;
        name_match || address_match
    }
}

///
/// Accumulates duplicate groups over the region partitions of one detection run.
///
pub struct DuplicateDetector<'a> {
    /// Groups in emission order
    groups: Vec<DuplicateGroup<'a>>,
    /// Fuzzy-match threshold as a percentage
    min_similarity: f64,
}

impl<'a> DuplicateDetector<'a> {
    ///
    /// Runs the exact and fuzzy passes over every region of `centers`.
    ///
    /// ## Arguments
    ///
    /// * `centers` - Active centers in fetch order (oldest first).
    /// * `min_similarity` - The similarity threshold (inclusive) for fuzzy matches.
    ///
    pub fn new(centers: &'a [CenterRecord], min_similarity: u8) -> Self {
        let mut detector = Self::init(min_similarity);
        for region in partition_by_region(centers) {
            if region.len() < 2 {
                continue;
            }
            let candidates: Vec<Candidate<'a>> =
                region.into_iter().map(Candidate::new).collect();
            detector.exact_pass(&candidates);
            detector.fuzzy_pass(&candidates);
        }
        detector
    }

    ///
    /// Sorts groups by similarity (highest first), keeps at most `max_results`
    /// and summarizes what was kept.
    ///
    pub fn into_report(self, max_results: usize) -> DetectionReport<'a> {
        let mut duplicates = self.groups;
        duplicates.sort_by(|a, b| b.similarity.cmp(&a.similarity));
        duplicates.truncate(max_results);
        let summary = summarize(&duplicates);
        DetectionReport {
            duplicates,
            summary,
        }
    }

    fn init(min_similarity: u8) -> Self {
        Self {
            groups: Vec::new(),
            min_similarity: f64::from(min_similarity),
        }
    }

    fn new_id(&self) -> String {
        format!("duplicate-group-{}", self.groups.len() + 1)
    }

    fn add(
        &mut self,
        centers: Vec<&'a CenterRecord>,
        similarity: u8,
        duplicate_type: DuplicateType,
        reason: String,
    ) {
        let group = DuplicateGroup {
            id: self.new_id(),
            centers,
            similarity,
            duplicate_type,
            reason,
            confidence: Confidence::from_similarity(similarity),
        };
        self.groups.push(group);
    }

    fn exact_pass(&mut self, candidates: &[Candidate<'a>]) {
        let mut lookup: FxHashMap<&str, usize> = FxHashMap::default();
        let mut buckets: Vec<Vec<&'a CenterRecord>> = Vec::new();
        for candidate in candidates.iter().filter(|c| !c.name.is_empty()) {
            match lookup.get(candidate.name.as_str()) {
                Some(&idx) => buckets[idx].push(candidate.center),
                None => {
                    lookup.insert(&candidate.name, buckets.len());
                    buckets.push(vec![candidate.center]);
                }
            }
        }
        for bucket in buckets.into_iter().filter(|b| b.len() >= 2) {
            self.add(
                bucket,
                100,
                DuplicateType::Name,
                String::from(EXACT_MATCH_REASON),
            );
        }
    }

    // Greedy seed-and-absorb: a record joins the first seed it matches and is
    // never reconsidered, so non-transitive chains may stay split.
    fn fuzzy_pass(&mut self, candidates: &[Candidate<'a>]) {
        let mut processed = vec![false; candidates.len()];
        for (i, current) in candidates.iter().enumerate() {
            if processed[i] {
                continue;
            }
            processed[i] = true;
            let mut cluster = vec![current];
            for (j, compare) in candidates.iter().enumerate().skip(i + 1) {
                if !processed[j] && current.matches(compare, self.min_similarity) {
                    processed[j] = true;
                    cluster.push(compare);
                }
            }
            if cluster.len() >= 2 {
                let score = ClusterScore::new(&cluster);
                let centers = cluster.iter().map(|c| c.center).collect();
                let reason = score.reason(self.min_similarity);
                self.add(centers, score.similarity(), score.duplicate_type(), reason);
            }
        }
    }
}

/// Averages of the non-zero pairwise similarities within a fuzzy cluster.
struct ClusterScore {
    name: f64,
    address: f64,
}

impl ClusterScore {
    fn new(cluster: &[&Candidate]) -> Self {
        let mut name_scores = Vec::new();
        let mut address_scores = Vec::new();
        for (i, a) in cluster.iter().enumerate() {
            for b in &cluster[i + 1..] {
                let name = a.name_similarity(b);
                if name > 0.0 {
                    name_scores.push(name);
                }
                let address = a.address_similarity(b);
                if address > 0.0 {
                    address_scores.push(address);
                }
            }
        }
        Self {
            name: average(&name_scores),
            address: average(&address_scores),
        }
    }

    fn similarity(&self) -> u8 {
        self.name.max(self.address).round().clamp(0.0, 100.0) as u8
    }

    fn duplicate_type(&self) -> DuplicateType {
        if self.name > self.address {
            DuplicateType::Name
        } else if self.address > self.name {
            DuplicateType::Address
        } else {
            DuplicateType::Both
        }
    }

    // Names the signals whose average reached the threshold, or the dominant
    // one when averaging pulled both below it.
    fn reason(&self, min_similarity: f64) -> String {
        let name = format!("name ({}%)", self.name.round());
        let address = format!("address ({}%)", self.address.round());
        match (self.name >= min_similarity, self.address >= min_similarity) {
            (true, true) => format!("Similar {name} and {address}"),
            (true, false) => format!("Similar {name}"),
            (false, true) => format!("Similar {address}"),
            (false, false) => match self.duplicate_type() {
                DuplicateType::Address => format!("Similar {address}"),
                DuplicateType::Name => format!("Similar {name}"),
                DuplicateType::Both => format!("Similar {name} and {address}"),
            },
        }
    }
}

#[inline]
fn average(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

#[inline]
fn region_key(center: &CenterRecord) -> Option<String> {
    if center.state.is_empty() && center.lga.is_empty() {
        return None;
    }
    Some(format!(
        "{}|{}",
        center.state.to_lowercase(),
        center.lga.to_lowercase()
    ))
}

/// Groups centers by (state, lga), keeping fetch order within and across regions.
fn partition_by_region(centers: &[CenterRecord]) -> Vec<Vec<&CenterRecord>> {
    let mut lookup: FxHashMap<String, usize> = FxHashMap::default();
    let mut regions: Vec<Vec<&CenterRecord>> = Vec::new();
    for center in centers {
        let Some(key) = region_key(center) else {
            continue;
        };
        let idx = *lookup.entry(key).or_insert_with(|| {
            regions.push(Vec::new());
            regions.len() - 1
        });
        regions[idx].push(center);
    }
    regions
}

fn summarize(groups: &[DuplicateGroup]) -> DetectionSummary {
    let mut summary = DetectionSummary {
        total_groups: groups.len(),
        ..Default::default()
    };
    let mut center_ids: FxHashSet<&str> = FxHashSet::default();
    for group in groups {
        center_ids.extend(group.centers.iter().map(|c| c.id.as_str()));
        match group.duplicate_type {
            DuplicateType::Name => summary.by_type.name += 1,
            DuplicateType::Address => summary.by_type.address += 1,
            DuplicateType::Both => summary.by_type.both += 1,
        }
        match group.confidence {
            Confidence::High => summary.by_confidence.high += 1,
            Confidence::Medium => summary.by_confidence.medium += 1,
            Confidence::Low => summary.by_confidence.low += 1,
        }
    }
    summary.total_centers = center_ids.len();
    summary
}

/// Finds duplicate groups among `centers` and returns the top `max_results`.
pub fn detect_duplicates<'a>(
    centers: &'a [CenterRecord],
    options: &DetectionOptions,
) -> DetectionReport<'a> {
    DuplicateDetector::new(centers, options.min_similarity).into_report(options.max_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn center(id: &str, name: &str, address: &str, state: &str, lga: &str) -> CenterRecord {
        let seq: i64 = id.trim_start_matches(|c: char| !c.is_ascii_digit()).parse().unwrap_or(0);
        let created = Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap();
        CenterRecord {
            id: id.to_string(),
            number: format!("CTR-{id}"),
            name: (!name.is_empty()).then(|| name.to_string()),
            address: (!address.is_empty()).then(|| address.to_string()),
            state: state.to_string(),
            lga: lga.to_string(),
            is_active: true,
            created_at: created,
            modified_at: created,
        }
    }

    fn ids(group: &DuplicateGroup) -> Vec<String> {
        group.centers.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn exact_match_after_common_words_removed() {
        let centers = vec![
            center("c1", "St Mary's Secondary School", "", "Lagos", "Ikeja"),
            center("c2", "St Mary's Model Secondary School", "", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        let exact = report
            .duplicates
            .iter()
            .find(|g| g.reason == EXACT_MATCH_REASON)
            .expect("exact group");
        assert_eq!(ids(exact), vec!["c1", "c2"]);
        assert_eq!(exact.similarity, 100);
        assert_eq!(exact.duplicate_type, DuplicateType::Name);
        assert_eq!(exact.confidence, Confidence::High);
    }

    #[test]
    fn exact_and_fuzzy_passes_both_report() {
        let centers = vec![
            center("c1", "Holy Child College", "", "Lagos", "Ikoyi"),
            center("c2", "Holy Child Secondary School", "", "Lagos", "Ikoyi"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert_eq!(report.duplicates.len(), 2);
        assert_eq!(report.duplicates[0].id, "duplicate-group-1");
        assert_eq!(report.duplicates[0].reason, EXACT_MATCH_REASON);
        assert_eq!(report.duplicates[1].id, "duplicate-group-2");
        assert_eq!(report.duplicates[1].reason, "Similar name (100%)");
        assert_eq!(report.summary.total_groups, 2);
        assert_eq!(report.summary.total_centers, 2);
    }

    #[test]
    fn regions_are_isolated() {
        let centers = vec![
            center("c1", "Kings Academy Annex", "", "Lagos", "Ikeja"),
            center("c2", "Kings Academy Annex", "", "Lagos", "Epe"),
            center("c3", "Kings Academy Annex", "", "Ogun", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert!(report.duplicates.is_empty());
        assert_eq!(report.summary, DetectionSummary::default());
    }

    #[test]
    fn region_key_ignores_case() {
        let centers = vec![
            center("c1", "Kings Annex", "", "LAGOS", "Ikeja"),
            center("c2", "Kings Annex", "", "lagos", "IKEJA"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert!(!report.duplicates.is_empty());
    }

    #[test]
    fn blank_region_never_matches() {
        let centers = vec![
            center("c1", "Kings Annex", "", "", ""),
            center("c2", "Kings Annex", "", "", ""),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn partially_blank_region_still_partitions() {
        let centers = vec![
            center("c1", "Kings Annex", "", "", ""),
            center("c3", "Kings Annex", "", "Lagos", ""),
            center("c4", "Kings Annex", "", "Lagos", ""),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert_eq!(report.duplicates.len(), 2);
        for group in &report.duplicates {
            assert_eq!(ids(group), vec!["c3", "c4"]);
        }
    }

    #[test]
    fn region_key_is_not_trimmed() {
        let centers = vec![
            center("c1", "Kings Annex", "", " Lagos", "Ikeja"),
            center("c2", "Kings Annex", "", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        // 20 characters, edit distance 3 => 85%
        let centers = vec![
            center("c1", "abcdefghijklmnopqrst", "", "Lagos", "Ikeja"),
            center("c2", "abcdefghijklmnopqxyz", "", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert_eq!(report.duplicates.len(), 1);
        let group = &report.duplicates[0];
        assert_eq!(group.similarity, 85);
        assert_eq!(group.duplicate_type, DuplicateType::Name);
        assert_eq!(group.confidence, Confidence::Medium);
        assert_eq!(group.reason, "Similar name (85%)");

        // 25 characters, edit distance 4 => 84%
        let centers = vec![
            center("c1", "abcdefghijklmnopqrstuvwxy", "", "Lagos", "Ikeja"),
            center("c2", "abcdefghijklmnopqrstu1234", "", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert!(report.duplicates.is_empty());

        let options = DetectionOptions {
            min_similarity: 84,
            ..Default::default()
        };
        let report = detect_duplicates(&centers, &options);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].similarity, 84);
        assert_eq!(report.duplicates[0].confidence, Confidence::Low);
    }

    #[test]
    fn unrelated_centers_are_not_grouped() {
        let centers = vec![
            center("c1", "Bishop Howells Memorial", "14 Marina Road", "Lagos", "Ikeja"),
            center("c2", "Queens Grammar Annex", "Plot 9 Obafemi Awolowo Way", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn address_match_alone_forms_group() {
        let centers = vec![
            center("c1", "Bishop Howells Memorial", "14 Marina Road, Lagos", "Lagos", "Ikeja"),
            center("c2", "Queens Annex", "14 Marina Rd. Lagos", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert_eq!(report.duplicates.len(), 1);
        let group = &report.duplicates[0];
        assert_eq!(group.similarity, 100);
        assert_eq!(group.duplicate_type, DuplicateType::Address);
        assert_eq!(group.reason, "Similar address (100%)");
        assert_eq!(report.summary.by_type.address, 1);
    }

    #[test]
    fn missing_names_and_addresses_never_match() {
        let centers = vec![
            center("c1", "", "", "Lagos", "Ikeja"),
            center("c2", "", "", "Lagos", "Ikeja"),
            center("c3", "Secondary School", "Street", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn first_seed_wins_for_non_transitive_chains() {
        // a~b (85%) and b~c (85%), a vs c is 70%
        let centers = vec![
            center("c1", "abcdefghijklmnopqrst", "", "Lagos", "Ikeja"),
            center("c2", "abcdefghijklmnopqxyz", "", "Lagos", "Ikeja"),
            center("c3", "abcdefghijklmnuvwxyz", "", "Lagos", "Ikeja"),
        ];
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(ids(&report.duplicates[0]), vec!["c1", "c2"]);
    }

    #[test]
    fn groups_sorted_and_truncated() {
        let mut centers = Vec::new();
        let names = [
            ("abcdefghijklmnopqrst", "abcdefghijklmnopqxyz"),
            ("bcdefghijklmnopqrstu", "bcdefghijklmnopqrstu"),
            ("cdefghijklmnopqrstuv", "cdefghijklmnopqrstxy"),
            ("defghijklmnopqrstuvw", "defghijklmnopqrstuvz"),
            ("efghijklmnopqrstuvwx", "efghijklmnopqrstuxyz"),
        ];
        for (i, (a, b)) in names.iter().enumerate() {
            let lga = format!("LGA {i}");
            centers.push(center(&format!("c{}", i * 2 + 1), a, "", "Lagos", &lga));
            centers.push(center(&format!("c{}", i * 2 + 2), b, "", "Lagos", &lga));
        }
        let report = detect_duplicates(&centers, &DetectionOptions::default());
        let similarities: Vec<u8> = report.duplicates.iter().map(|g| g.similarity).collect();
        assert_eq!(similarities, vec![100, 100, 95, 90, 85, 85]);
        assert_eq!(report.summary.by_confidence.high, 3);

        let options = DetectionOptions {
            max_results: 1,
            ..Default::default()
        };
        let report = detect_duplicates(&centers, &options);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].similarity, 100);
        assert_eq!(ids(&report.duplicates[0]), vec!["c3", "c4"]);
        assert_eq!(report.summary.total_groups, 1);
        assert_eq!(report.summary.total_centers, 2);
    }

    #[test]
    fn cluster_score_averages_non_zero_pairs() {
        let centers = vec![
            center("c1", "abcdefghijklmnopqrst", "12 allen ikeja", "Lagos", "Ikeja"),
            center("c2", "abcdefghijklmnopqrsz", "", "Lagos", "Ikeja"),
            center("c3", "abcdefghijklmnopqryz", "12 allen ikeja", "Lagos", "Ikeja"),
        ];
        let candidates: Vec<Candidate> = centers.iter().map(Candidate::new).collect();
        let cluster: Vec<&Candidate> = candidates.iter().collect();
        let score = ClusterScore::new(&cluster);
        // name pairs: 95, 90, 95; address pairs: 100 (the others involve an empty address)
        assert!((score.name - 280.0 / 3.0).abs() < 1e-9);
        assert_eq!(score.address, 100.0);
        assert_eq!(score.similarity(), 100);
        assert_eq!(score.duplicate_type(), DuplicateType::Address);
        assert_eq!(score.reason(85.0), "Similar name (93%) and address (100%)");
        assert_eq!(score.reason(95.0), "Similar address (100%)");
    }

    #[test]
    fn equal_averages_report_both() {
        let score = ClusterScore {
            name: 90.0,
            address: 90.0,
        };
        assert_eq!(score.duplicate_type(), DuplicateType::Both);
        assert_eq!(score.similarity(), 90);
        assert_eq!(score.reason(95.0), "Similar name (90%) and address (90%)");
    }

    #[test]
    fn reason_omits_signal_below_threshold() {
        let score = ClusterScore {
            name: 90.0,
            address: 40.0,
        };
        assert_eq!(score.reason(85.0), "Similar name (90%)");
        assert_eq!(score.reason(30.0), "Similar name (90%) and address (40%)");
    }

    #[test]
    fn summary_counts_every_bucket() {
        let centers = vec![
            center(
                "c1",
                "abcdefghijklmnopqrst",
                "abcdefghijklmnopqrst",
                "Lagos",
                "Ikeja",
            ),
            center(
                "c2",
                "abcdefghijklmnopqxyz",
                "abcdefghijklmnopqxyz",
                "Lagos",
                "Ikeja",
            ),
            center("c3", "abcdefghijklmnopqrstuvwxy", "", "Lagos", "Epe"),
            center("c4", "abcdefghijklmnopqrstu1234", "", "Lagos", "Epe"),
        ];
        let options = DetectionOptions {
            min_similarity: 80,
            ..Default::default()
        };
        let report = detect_duplicates(&centers, &options);
        let summary = &report.summary;
        assert_eq!(summary.total_groups, 2);
        assert_eq!(summary.total_centers, 4);
        assert_eq!(summary.by_type.both, 1);
        assert_eq!(summary.by_type.name, 1);
        assert_eq!(summary.by_type.address, 0);
        assert_eq!(summary.by_confidence.high, 0);
        assert_eq!(summary.by_confidence.medium, 1);
        assert_eq!(summary.by_confidence.low, 1);
        assert_eq!(report.duplicates[0].duplicate_type, DuplicateType::Both);
        assert_eq!(report.duplicates[0].similarity, 85);
        assert_eq!(report.duplicates[1].similarity, 84);
    }
}
