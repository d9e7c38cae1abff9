use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{NaiveDateTime, Timelike};
use geom::{Duration, GPSBounds, LonLat, Time};
use serde::Deserialize;

use crate::{PathPoint, Trajectory, VehicleName};

/// Reads AVL (automatic vehicle location) records, returning the bounds of everything seen and
/// one trajectory per vehicle. Times are seconds since midnight; the date is ignored. Vehicles
/// without a usable trajectory are skipped with a warning.
pub fn load<R: std::io::Read>(reader: R) -> Result<(GPSBounds, Vec<(VehicleName, Trajectory)>)> {
    // Read raw data
    let mut gps_bounds = GPSBounds::new();
    let mut data_per_vehicle: BTreeMap<VehicleName, Vec<(LonLat, Time)>> = BTreeMap::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: AVL = rec?;

        let datetime = NaiveDateTime::parse_from_str(&rec.datetime, "%Y-%m-%d %H:%M:%S")?;
        let time = datetime.time();
        let time = Time::START_OF_DAY
            + Duration::hours(time.hour() as usize)
            + Duration::minutes(time.minute() as usize)
            + Duration::seconds(time.second() as f64);

        let pos = LonLat::new(rec.longitude, rec.latitude);
        gps_bounds.update(pos);

        data_per_vehicle
            .entry(rec.vehicle_name)
            .or_insert_with(Vec::new)
            .push((pos, time));
    }

    // Calculate trajectories
    let mut results = Vec::new();
    for (vehicle_name, raw_pts) in data_per_vehicle {
        let mut points = Vec::new();
        for (gps, time) in raw_pts {
            let pt = gps.to_pt(&gps_bounds);
            points.push(PathPoint::new(pt.x(), pt.y(), time.inner_seconds()));
        }
        match Trajectory::new(points) {
            Ok(trajectory) => results.push((vehicle_name, trajectory)),
            Err(err) => warn!("Skipping {:?}: {}", vehicle_name, err),
        }
    }
    Ok((gps_bounds, results))
}

#[derive(Deserialize)]
struct AVL {
    #[serde(rename = "CODVEICULO", alias = "vehicle")]
    vehicle_name: VehicleName,
    #[serde(rename = "DATAHORACOORD", alias = "datetime")]
    datetime: String,
    #[serde(rename = "LATITUDE", alias = "latitude")]
    latitude: f64,
    #[serde(rename = "LONGITUDE", alias = "longitude")]
    longitude: f64,
}
