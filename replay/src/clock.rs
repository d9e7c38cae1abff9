use std::str::FromStr;

use anyhow::Result;
use geom::{Duration, Time};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum SpeedSetting {
    /// 1 sim second per real second
    Realtime,
    /// 5 sim seconds per real second
    Fast,
    /// 30 sim seconds per real second
    Faster,
    /// 1 sim hour per real second
    Fastest,
}

impl SpeedSetting {
    fn multiplier(self) -> f64 {
        match self {
            SpeedSetting::Realtime => 1.0,
            SpeedSetting::Fast => 5.0,
            SpeedSetting::Faster => 30.0,
            SpeedSetting::Fastest => 3600.0,
        }
    }
}

impl FromStr for SpeedSetting {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "realtime" => Ok(SpeedSetting::Realtime),
            "fast" => Ok(SpeedSetting::Fast),
            "faster" => Ok(SpeedSetting::Faster),
            "fastest" => Ok(SpeedSetting::Fastest),
            _ => bail!("Unknown speed {x}; use realtime, fast, faster, or fastest"),
        }
    }
}

/// Drives the current time of the replay.
pub struct Clock {
    time: Time,
    setting: SpeedSetting,
}

impl Clock {
    pub fn new(time: Time, setting: SpeedSetting) -> Self {
        Self { time, setting }
    }

    pub fn time(&self) -> Time {
        self.time
    }

    /// Moves time forward by however much sim time passes in `real_dt` at the current speed.
    pub fn advance(&mut self, real_dt: Duration) {
        self.time += self.setting.multiplier() * real_dt;
    }
}
