//! Snapshot persistence of the workout list.
//!
//! The whole list is written as one JSON array under [`STORAGE_KEY`] on every
//! change. Reading yields flat [`WorkoutRecord`]s; [`reconstruct`] turns each
//! back into a typed [`Workout`].

use crate::dlog;
use crate::kv::KeyValueStore;
use crate::types::{Coords, Workout, WorkoutId, WorkoutKind, WorkoutType};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STORAGE_KEY: &str = "workouts";

/// Flat attribute bag as stored in the blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub coordinates: Coords,
    pub distance_km: f64,
    pub duration_min: f64,
    pub description: String,
    #[serde(default)]
    pub click_count: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence_spm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace_min_per_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_km_per_h: Option<f64>,
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let (cadence_spm, pace_min_per_km, elevation_gain_m, speed_km_per_h) = match *w.kind() {
            WorkoutKind::Running {
                cadence_spm,
                pace_min_per_km,
            } => (Some(cadence_spm), Some(pace_min_per_km), None, None),
            WorkoutKind::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => (None, None, Some(elevation_gain_m), Some(speed_km_per_h)),
        };

        Self {
            id: w.id().to_string(),
            created_at: w.created_at(),
            coordinates: w.coords(),
            distance_km: w.distance_km(),
            duration_min: w.duration_min(),
            description: w.description().to_string(),
            click_count: w.click_count(),
            kind: w.workout_type().to_string(),
            cadence_spm,
            pace_min_per_km,
            elevation_gain_m,
            speed_km_per_h,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructError {
    #[error("record {id}: unknown workout type {kind:?}")]
    UnknownType { id: String, kind: String },

    #[error("record {id}: missing field {field}")]
    MissingField { id: String, field: &'static str },
}

/// Restore the typed shape of a stored record. Nothing is re-derived.
pub fn reconstruct(record: WorkoutRecord) -> Result<Workout, ReconstructError> {
    let id = record.id;
    let missing = |id: &str, field| ReconstructError::MissingField {
        id: id.to_string(),
        field,
    };

    let kind = match record.kind.as_str() {
        k if k == WorkoutType::Running.as_str() => WorkoutKind::Running {
            cadence_spm: record.cadence_spm.ok_or_else(|| missing(&id, "cadenceSpm"))?,
            pace_min_per_km: record
                .pace_min_per_km
                .ok_or_else(|| missing(&id, "paceMinPerKm"))?,
        },
        k if k == WorkoutType::Cycling.as_str() => WorkoutKind::Cycling {
            elevation_gain_m: record
                .elevation_gain_m
                .ok_or_else(|| missing(&id, "elevationGainM"))?,
            speed_km_per_h: record
                .speed_km_per_h
                .ok_or_else(|| missing(&id, "speedKmPerH"))?,
        },
        other => {
            return Err(ReconstructError::UnknownType {
                id,
                kind: other.to_string(),
            });
        }
    };

    Ok(Workout::from_parts(
        WorkoutId::from(id.as_str()),
        record.created_at,
        record.coordinates,
        record.distance_km,
        record.duration_min,
        record.description,
        record.click_count,
        kind,
    ))
}

pub fn serialize(workouts: &[Workout]) -> Result<String> {
    let records: Vec<WorkoutRecord> = workouts.iter().map(WorkoutRecord::from).collect();
    serde_json::to_string(&records).context("Serializing workouts")
}

/// Absent or corrupt blobs read as an empty list.
pub fn deserialize(blob: Option<&str>) -> Vec<WorkoutRecord> {
    let Some(blob) = blob else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<WorkoutRecord>>(blob) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(err = %e, "stored workouts are corrupt; starting empty");
            Vec::new()
        }
    }
}

/// [`deserialize`] then [`reconstruct`], dropping records that fail.
pub fn rehydrate(blob: Option<&str>) -> Vec<Workout> {
    deserialize(blob)
        .into_iter()
        .filter_map(|r| match reconstruct(r) {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(err = %e, "dropping unreadable workout record");
                None
            }
        })
        .collect()
}

/// The workout list bound to a key-value backend.
pub struct WorkoutStore<K> {
    kv: K,
}

impl<K: KeyValueStore> WorkoutStore<K> {
    pub const fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Read failures are treated like an absent blob.
    pub fn load(&self) -> Vec<Workout> {
        let blob = match self.kv.get(STORAGE_KEY) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(err = %format!("{e:#}"), "reading stored workouts failed");
                None
            }
        };
        let workouts = rehydrate(blob.as_deref());
        dlog!("store_load workouts={}", workouts.len());
        workouts
    }

    pub fn save(&mut self, workouts: &[Workout]) -> Result<()> {
        let blob = serialize(workouts)?;
        self.kv
            .set(STORAGE_KEY, &blob)
            .context("Persisting workouts")
    }

    pub fn clear(&mut self) -> Result<()> {
        self.kv.remove(STORAGE_KEY).context("Clearing workouts")
    }

    pub const fn backend(&self) -> &K {
        &self.kv
    }
}
