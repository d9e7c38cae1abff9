#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod clock;

use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use geom::{Duration, Time, UnitFmt};
use serde::Serialize;
use structopt::StructOpt;

use model::{
    decode_picking_color, ActiveAlpha, Color, FadePolicy, Frame, FrameStats, Layer,
    LayerSettings, Marker, Model, Vehicle, VehicleID, VehicleName, Viewport,
};

use self::clock::{Clock, SpeedSetting};

#[derive(StructOpt)]
struct Args {
    /// The path to a previously built and serialized model
    #[structopt(long)]
    model: Option<String>,
    /// The path to an AVL CSV file
    #[structopt(long)]
    avl: Option<String>,
    /// The path to a JSON file with layer settings
    #[structopt(long)]
    settings: Option<String>,
    /// When to start the replay, like 07:30:00. Defaults to the earliest AVL record.
    #[structopt(long)]
    start: Option<String>,
    /// When to stop the replay. Defaults to the latest AVL record.
    #[structopt(long)]
    end: Option<String>,
    /// realtime, fast, faster, or fastest
    #[structopt(long, default_value = "faster")]
    speed: SpeedSetting,
    /// Real seconds between frames
    #[structopt(long, default_value = "1.0")]
    step: f64,
    /// Hide vehicles moving faster than this, in meters per second
    #[structopt(long)]
    max_speed: Option<f64>,
    /// Seconds for a vehicle to fade in at the end of its trajectory
    #[structopt(long)]
    fade_in: Option<f64>,
    /// What happens once a segment ends: exit or entry
    #[structopt(long)]
    policy: Option<String>,
    /// Opacity while a segment is in progress: full or progress
    #[structopt(long)]
    active_alpha: Option<String>,
    /// Vehicle radius in meters
    #[structopt(long, default_value = "50.0")]
    radius: f64,
    /// Give each vehicle its own color
    #[structopt(long)]
    color_by_vehicle: bool,
    #[structopt(long, default_value = "1600")]
    width: f64,
    #[structopt(long, default_value = "900")]
    height: f64,
    #[structopt(long, default_value = "0")]
    zoom: f64,
    /// Describe the vehicle drawn at this pixel every frame, like 800,450
    #[structopt(long)]
    pick: Option<String>,
    /// Write every frame's markers to this JSON file
    #[structopt(long)]
    output: Option<String>,
}

impl Args {
    fn load(&mut self, timer: &mut Timer) -> Result<Model> {
        if let Some(path) = self.model.take() {
            if self.avl.is_some() {
                bail!("If --model is specified, nothing will be imported");
            }
            return abstio::maybe_read_binary::<Model>(path, timer);
        }
        let path = match self.avl.take() {
            Some(path) => path,
            None => bail!("Either --model or --avl needed"),
        };
        let model = Model::import_avl(fs_err::File::open(path)?, timer)?;
        abstio::write_binary("data/output/model.bin".to_string(), &model);
        Ok(model)
    }

    fn settings(&self, timer: &mut Timer) -> Result<LayerSettings> {
        let mut settings = match self.settings {
            Some(ref path) => abstio::maybe_read_json::<LayerSettings>(path.clone(), timer)?,
            None => LayerSettings::default(),
        };
        if self.max_speed.is_some() {
            settings.max_speed = self.max_speed;
        }
        if self.fade_in.is_some() {
            settings.fade_in_time = self.fade_in;
        }
        if let Some(ref policy) = self.policy {
            settings.fade_policy = match policy.as_ref() {
                "exit" => FadePolicy::ExitFade,
                "entry" => FadePolicy::EntryFade,
                _ => bail!("Unknown --policy {policy}; use exit or entry"),
            };
        }
        if let Some(ref mode) = self.active_alpha {
            settings.active_alpha = match mode.as_ref() {
                "full" => ActiveAlpha::Full,
                "progress" => ActiveAlpha::Progress,
                _ => bail!("Unknown --active-alpha {mode}; use full or progress"),
            };
        }
        Ok(settings)
    }

    fn time_range(&self, model: &Model) -> Result<(Time, Time)> {
        let (first, last) = match model.time_range() {
            Some(pair) => pair,
            None => bail!("The model has no vehicles"),
        };
        let start = match self.start {
            Some(ref x) => Time::parse(x)?,
            None => Time::START_OF_DAY + Duration::seconds(first),
        };
        let end = match self.end {
            Some(ref x) => Time::parse(x)?,
            None => Time::START_OF_DAY + Duration::seconds(last),
        };
        if start > end {
            bail!("The replay starts at {start}, after it ends at {end}");
        }
        Ok((start, end))
    }

    fn pick(&self) -> Result<Option<[f64; 2]>> {
        let raw = match self.pick {
            Some(ref x) => x,
            None => return Ok(None),
        };
        let parts = raw
            .split(',')
            .map(|x| x.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()?;
        if parts.len() != 2 {
            bail!("--pick should look like x,y, not {raw}");
        }
        Ok(Some([parts[0], parts[1]]))
    }
}

#[derive(Serialize)]
struct FrameOutput {
    time: String,
    stats: FrameStats,
    markers: Vec<DrawnVehicle>,
}

#[derive(Serialize)]
struct DrawnVehicle {
    vehicle: VehicleID,
    name: VehicleName,
    marker: Marker,
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    let mut args = Args::from_iter(abstutil::cli_args());
    if !(args.step > 0.0) {
        bail!("--step must be positive");
    }
    let mut timer = Timer::new("replay vehicles");
    let model = args.load(&mut timer)?;
    let settings = args.settings(&mut timer)?;
    let (start, end) = args.time_range(&model)?;
    let pick = args.pick()?;

    let viewport = Viewport::fit(&model.bounds, args.width, args.height, args.zoom);
    let mut accessors = Vehicle::accessors().radius({
        let radius = args.radius;
        move |_, _| radius
    });
    if args.color_by_vehicle {
        accessors = accessors.color(|_, idx| {
            let c = colorous::TABLEAU10[idx % colorous::TABLEAU10.len()];
            Color::rgb(c.r, c.g, c.b)
        });
    } else {
        accessors = accessors.color(|_, _| Color::rgb(255, 0, 0));
    }
    let layer = Layer::new(model.vehicles, accessors, &mut timer);

    let metric = UnitFmt::metric();
    let mut clock = Clock::new(start, args.speed);
    let mut num_frames = 0;
    let mut output = Vec::new();
    while clock.time() <= end {
        let time = clock.time();
        let config = settings.frame_config(time.inner_seconds(), &viewport);
        let frame = layer.evaluate(&config, &viewport);
        info!("{}: {}", time.ampm_tostring(), frame.stats.describe());

        if let Some(pt) = pick {
            describe_pick(&layer, &frame, pt, time, &metric);
        }
        if args.output.is_some() {
            let markers = frame
                .visible()
                .filter_map(|(_, sample)| sample.marker)
                .filter_map(|marker| {
                    let idx = decode_picking_color(marker.picking_color)?;
                    let vehicle = layer.entity(idx)?;
                    Some(DrawnVehicle {
                        vehicle: vehicle.id,
                        name: vehicle.original_id.clone(),
                        marker,
                    })
                })
                .collect();
            output.push(FrameOutput {
                time: time.to_string(),
                stats: frame.stats.clone(),
                markers,
            });
        }

        num_frames += 1;
        clock.advance(Duration::seconds(args.step));
    }
    info!("Replayed {} frames", prettyprint_usize(num_frames));

    if let Some(path) = args.output.take() {
        abstio::write_json(path, &output);
    }
    Ok(())
}

fn describe_pick(
    layer: &Layer<Vehicle>,
    frame: &Frame,
    pt: [f64; 2],
    time: Time,
    metric: &UnitFmt,
) {
    let vehicle = match frame.pick(pt).and_then(|idx| layer.entity(idx)) {
        Some(vehicle) => vehicle,
        None => {
            info!("  Nothing drawn at {:?}", pt);
            return;
        }
    };
    match vehicle.trajectory.interpolate(time.inner_seconds()) {
        Some((_, speed)) => info!(
            "  {:?} is at {:?}, currently with speed {}",
            vehicle.original_id,
            pt,
            speed.to_string(metric)
        ),
        // Still fading out after its last segment
        None => info!(
            "  {:?} is at {:?}, finished at {}",
            vehicle.original_id,
            pt,
            Time::START_OF_DAY + Duration::seconds(vehicle.trajectory.end_time())
        ),
    }
}
