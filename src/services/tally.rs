//! Result aggregation for all four election types.
//!
//! Kept free of any database access so the display invariants (vote sums,
//! percentages, the leading badge, rating averages) can be tested directly.

use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::election::{Election, ElectionType, RatingScale};
use crate::models::vote::{Choice, Vote};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_label: Option<String>,
    pub name: String,
    pub profile_image: String,
    pub votes: u64,
    pub percentage: f64,
    pub leading: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceTally {
    pub choice: Choice,
    pub votes: u64,
    pub percentage: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: i32,
    pub votes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultsData {
    #[serde(rename_all = "camelCase")]
    Options {
        results: Vec<OptionTally>,
        total_votes: u64,
    },
    #[serde(rename_all = "camelCase")]
    YesNo {
        proposition: String,
        choices: Vec<ChoiceTally>,
        total_votes: u64,
    },
    #[serde(rename_all = "camelCase")]
    Rating {
        rating_options: RatingScale,
        distribution: Vec<RatingBucket>,
        average_rating: f64,
        total_votes: u64,
    },
}

impl ResultsData {
    pub fn total_votes(&self) -> u64 {
        match self {
            ResultsData::Options { total_votes, .. }
            | ResultsData::YesNo { total_votes, .. }
            | ResultsData::Rating { total_votes, .. } => *total_votes,
        }
    }
}

/// Aggregates raw votes against the election's ballot definition.
///
/// Options are returned sorted by vote count descending; ties keep the
/// ballot's own order. The leading badge is set only on a strict winner with
/// at least one vote, and only for the candidate/image types.
pub fn aggregate(election: &Election, votes: &[Vote]) -> ResultsData {
    match election.election_type {
        ElectionType::CandidateBased => aggregate_candidates(election, votes),
        ElectionType::ImageBased => aggregate_images(election, votes),
        ElectionType::YesNo => aggregate_yes_no(election, votes),
        ElectionType::Rating => aggregate_rating(election, votes),
    }
}

fn aggregate_candidates(election: &Election, votes: &[Vote]) -> ResultsData {
    let mut counts: HashMap<ObjectId, u64> = HashMap::new();
    for vote in votes {
        if let Some(candidate) = vote.candidate {
            *counts.entry(candidate).or_default() += 1;
        }
    }

    let mut results: Vec<OptionTally> = election
        .candidates
        .iter()
        .map(|entry| {
            let votes = entry
                .candidate_id
                .and_then(|id| counts.get(&id).copied())
                .unwrap_or(0);
            OptionTally {
                candidate_id: entry.candidate_id.map(|id| id.to_hex()),
                image_id: None,
                image_url: None,
                image_label: None,
                name: entry.name.clone(),
                profile_image: entry.profile_image.clone(),
                votes,
                percentage: 0.0,
                leading: false,
            }
        })
        .collect();

    finish_options(&mut results)
}

fn aggregate_images(election: &Election, votes: &[Vote]) -> ResultsData {
    let mut results: Vec<OptionTally> = election
        .candidates
        .iter()
        .map(|entry| {
            let votes = votes
                .iter()
                .filter(|vote| {
                    vote.selected_image_id
                        .as_ref()
                        .is_some_and(|selected| entry.matches_image(selected))
                })
                .count() as u64;
            OptionTally {
                candidate_id: None,
                image_id: entry.image_id.or(entry.entry_id).map(|id| id.to_hex()),
                image_url: entry.image_url.clone(),
                image_label: entry.image_label.clone(),
                name: entry.name.clone(),
                profile_image: entry.profile_image.clone(),
                votes,
                percentage: 0.0,
                leading: false,
            }
        })
        .collect();

    finish_options(&mut results)
}

fn finish_options(results: &mut Vec<OptionTally>) -> ResultsData {
    // Stable sort: tied options keep ballot order.
    results.sort_by(|a, b| b.votes.cmp(&a.votes));
    let total: u64 = results.iter().map(|r| r.votes).sum();
    for tally in results.iter_mut() {
        tally.percentage = percentage(tally.votes, total);
    }
    if let Some(top) = results.first().map(|r| r.votes) {
        let strict_winner = top > 0 && results.iter().filter(|r| r.votes == top).count() == 1;
        if strict_winner {
            results[0].leading = true;
        }
    }
    ResultsData::Options {
        results: std::mem::take(results),
        total_votes: total,
    }
}

fn aggregate_yes_no(election: &Election, votes: &[Vote]) -> ResultsData {
    let yes = votes.iter().filter(|v| v.choice == Some(Choice::Yes)).count() as u64;
    let no = votes.iter().filter(|v| v.choice == Some(Choice::No)).count() as u64;
    let total = yes + no;
    ResultsData::YesNo {
        proposition: election.proposition.clone().unwrap_or_default(),
        choices: vec![
            ChoiceTally {
                choice: Choice::Yes,
                votes: yes,
                percentage: percentage(yes, total),
            },
            ChoiceTally {
                choice: Choice::No,
                votes: no,
                percentage: percentage(no, total),
            },
        ],
        total_votes: total,
    }
}

fn aggregate_rating(election: &Election, votes: &[Vote]) -> ResultsData {
    let mut buckets: HashMap<i32, u64> = HashMap::new();
    for vote in votes {
        if let Some(rating) = vote.rating_value {
            *buckets.entry(rating).or_default() += 1;
        }
    }

    let mut distribution: Vec<RatingBucket> = buckets
        .into_iter()
        .map(|(rating, votes)| RatingBucket { rating, votes })
        .collect();
    distribution.sort_by_key(|bucket| bucket.rating);

    let total: u64 = distribution.iter().map(|b| b.votes).sum();
    let score_sum: i64 = distribution
        .iter()
        .map(|b| b.rating as i64 * b.votes as i64)
        .sum();
    let average = if total > 0 {
        round_to(score_sum as f64 / total as f64, 2)
    } else {
        0.0
    };

    ResultsData::Rating {
        rating_options: election.rating_options.clone().unwrap_or_default(),
        distribution,
        average_rating: average,
        total_votes: total,
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(part as f64 * 100.0 / total as f64, 1)
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::election::{BallotEntry, ElectionStatus};
    use chrono::{Duration, Utc};

    fn election(election_type: ElectionType) -> Election {
        let now = Utc::now();
        Election {
            id: Some(ObjectId::new()),
            title: "Test".into(),
            description: "Test".into(),
            election_type,
            proposition: Some("Adopt the proposal?".into()),
            rating_options: Some(RatingScale::default()),
            thumbnail: "no-thumbnail.jpg".into(),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            candidates: vec![],
            applications: vec![],
            status: ElectionStatus::Active,
            manual_status: false,
            created_by: ObjectId::new(),
            created_at: now,
        }
    }

    fn candidate_entry(id: ObjectId, name: &str) -> BallotEntry {
        BallotEntry {
            candidate_id: Some(id),
            name: name.into(),
            ..Default::default()
        }
    }

    fn candidate_vote(election_id: ObjectId, candidate: ObjectId) -> Vote {
        let mut vote = Vote::new(election_id, ObjectId::new());
        vote.candidate = Some(candidate);
        vote
    }

    #[test]
    fn candidate_results_sum_and_leading() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let mut e = election(ElectionType::CandidateBased);
        e.candidates = vec![candidate_entry(a, "A"), candidate_entry(b, "B")];
        let eid = e.id.unwrap();

        let mut votes = Vec::new();
        votes.extend((0..10).map(|_| candidate_vote(eid, a)));
        votes.extend((0..5).map(|_| candidate_vote(eid, b)));

        let ResultsData::Options {
            results,
            total_votes,
        } = aggregate(&e, &votes)
        else {
            panic!("expected option results");
        };
        assert_eq!(total_votes, 15);
        assert_eq!(results.iter().map(|r| r.votes).sum::<u64>(), total_votes);
        assert_eq!(results[0].name, "A");
        assert_eq!(results[0].percentage, 66.7);
        assert!(results[0].leading);
        assert!(!results[1].leading);
    }

    #[test]
    fn exact_tie_marks_no_leader_and_keeps_ballot_order() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let mut e = election(ElectionType::CandidateBased);
        e.candidates = vec![candidate_entry(a, "A"), candidate_entry(b, "B")];
        let eid = e.id.unwrap();

        let votes: Vec<Vote> = (0..3)
            .flat_map(|_| [candidate_vote(eid, a), candidate_vote(eid, b)])
            .collect();

        let ResultsData::Options { results, .. } = aggregate(&e, &votes) else {
            panic!("expected option results");
        };
        assert_eq!(results[0].name, "A");
        assert_eq!(results[1].name, "B");
        assert!(results.iter().all(|r| !r.leading));
        assert!(results.iter().all(|r| r.percentage == 50.0));
    }

    #[test]
    fn zero_votes_mark_no_leader() {
        let a = ObjectId::new();
        let mut e = election(ElectionType::CandidateBased);
        e.candidates = vec![candidate_entry(a, "A")];

        let ResultsData::Options {
            results,
            total_votes,
        } = aggregate(&e, &[])
        else {
            panic!("expected option results");
        };
        assert_eq!(total_votes, 0);
        assert!(!results[0].leading);
        assert_eq!(results[0].percentage, 0.0);
    }

    #[test]
    fn yes_no_tie_splits_fifty_fifty() {
        let e = election(ElectionType::YesNo);
        let eid = e.id.unwrap();
        let votes: Vec<Vote> = (0..3)
            .flat_map(|_| {
                let mut yes = Vote::new(eid, ObjectId::new());
                yes.choice = Some(Choice::Yes);
                let mut no = Vote::new(eid, ObjectId::new());
                no.choice = Some(Choice::No);
                [yes, no]
            })
            .collect();

        let ResultsData::YesNo {
            choices,
            total_votes,
            ..
        } = aggregate(&e, &votes)
        else {
            panic!("expected yes/no results");
        };
        assert_eq!(total_votes, 6);
        assert!(choices.iter().all(|c| c.votes == 3 && c.percentage == 50.0));
    }

    #[test]
    fn rating_average_is_weighted_mean_rounded_to_two_places() {
        let e = election(ElectionType::Rating);
        let eid = e.id.unwrap();
        // two 5s and one 4: average 14/3 = 4.666... -> 4.67
        let votes: Vec<Vote> = [5, 5, 4]
            .into_iter()
            .map(|rating| {
                let mut vote = Vote::new(eid, ObjectId::new());
                vote.rating_value = Some(rating);
                vote
            })
            .collect();

        let ResultsData::Rating {
            distribution,
            average_rating,
            total_votes,
            ..
        } = aggregate(&e, &votes)
        else {
            panic!("expected rating results");
        };
        assert_eq!(total_votes, 3);
        assert_eq!(average_rating, 4.67);
        assert_eq!(
            distribution.iter().map(|b| b.votes).sum::<u64>(),
            total_votes
        );
        // distribution sorted by rating ascending
        assert!(distribution.windows(2).all(|w| w[0].rating < w[1].rating));
    }

    #[test]
    fn empty_rating_election_averages_zero() {
        let e = election(ElectionType::Rating);
        let ResultsData::Rating {
            average_rating,
            total_votes,
            ..
        } = aggregate(&e, &[])
        else {
            panic!("expected rating results");
        };
        assert_eq!(total_votes, 0);
        assert_eq!(average_rating, 0.0);
    }
}
