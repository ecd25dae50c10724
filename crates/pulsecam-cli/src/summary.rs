use console::Style;
use pulsecam_core::magnify::BpmReading;
use pulsecam_core::session::{SessionConfig, SessionReport};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    ready: Style,
    pending: Style,
    warning: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ready: Style::new().green(),
            pending: Style::new().dim().yellow(),
            warning: Style::new().yellow().bold(),
            path: Style::new().underlined(),
        }
    }

    fn reading(&self, reading: &BpmReading) -> String {
        match reading {
            BpmReading::Ready(_) => self.ready.apply_to(reading).to_string(),
            BpmReading::WarmingUp => self.pending.apply_to(reading).to_string(),
        }
    }
}

pub fn print_session_summary(config: &SessionConfig) {
    let s = Styles::new();
    let est = &config.estimator;

    println!();
    println!("  {}", s.title.apply_to("Pulse Estimation"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    match config.output_dir {
        Some(ref dir) => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.path.apply_to(dir.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.pending.apply_to("none")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Estimator"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Passband"),
        s.value.apply_to(format!(
            "{:.2}-{:.2} Hz ({:.0}-{:.0} BPM)",
            est.min_frequency,
            est.max_frequency,
            est.min_frequency * 60.0,
            est.max_frequency * 60.0
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Frame rate"),
        s.value.apply_to(format!("{} fps", est.frame_rate))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(format!(
            "{} frames ({:.1} s)",
            est.buffer_size,
            est.window_seconds()
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Warm-up"),
        s.value.apply_to(format!("{} frames", est.warm_up_frames()))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Gain"),
        s.value.apply_to(format!("x{} at level {}", est.alpha, est.pyramid_levels))
    );
    println!();

    println!("  {}", s.header.apply_to("Regions"));
    for (i, region) in config.regions.iter().enumerate() {
        println!("    {}. {}", s.label.apply_to(i + 1), s.value.apply_to(region));
    }
    println!();
}

pub fn print_report(report: &SessionReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Timeline"));
    for sample in &report.timeline {
        println!(
            "    {:>7.2}s  {}",
            sample.time_s,
            s.reading(&sample.combined)
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Regions"));
    for (name, reading) in &report.region_readings {
        println!("    {:<14}{}", s.label.apply_to(name), s.reading(reading));
    }
    println!();

    if let Some(fps) = report.measured_frame_rate {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Measured fps"),
            s.value.apply_to(format!("{:.2}", fps))
        );
    }
    if report.cadence_drift {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Cadence"),
            s.warning.apply_to("differs from the configured frame rate")
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(report.frames_processed)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Heart rate"),
        s.reading(&report.final_reading)
    );
    println!();
}
