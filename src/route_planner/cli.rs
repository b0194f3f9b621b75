// cli.rs
//
// Interactive menu for planning a trip: pick two points, search both routes,
// then inspect, draw or export them.

use crate::predictor::TrafficPredictor;
use crate::route_planner::export::{export_geojson, export_points_csv};
use crate::route_planner::route_map::render_route_map;
use crate::route_planner::session::{RouteComparison, RouteSession};
use crate::route_services::{RouteMetrics, RouteProvider, WeatherClient, WeatherReport};
use crate::shared_data::{Coordinate, RoutePreference};
use chrono::Local;
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

pub struct PlannerApp {
    pub session: RouteSession,
    pub provider: Box<dyn RouteProvider>,
    pub predictor: TrafficPredictor,
    pub weather: Option<WeatherClient>,
    pub output_dir: PathBuf,
}

impl PlannerApp {
    pub fn new(provider: Box<dyn RouteProvider>, predictor: TrafficPredictor, weather: Option<WeatherClient>) -> Self {
        Self {
            session: RouteSession::new(),
            provider,
            predictor,
            weather,
            output_dir: PathBuf::from("."),
        }
    }
}

// Prints a prompt and reads one trimmed line. `None` on end of input.
fn prompt(message: &str) -> Option<String> {
    print!("{}", message);
    stdout().flush().ok()?;
    let mut input = String::new();
    match stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

pub fn parse_route_choice(input: &str) -> Option<RoutePreference> {
    match input.trim() {
        "1" => Some(RoutePreference::Fastest),
        "2" => Some(RoutePreference::Shortest),
        _ => None,
    }
}

/// Duration/distance table for both routes, durations annotated with the
/// predicted traffic level.
pub fn results_table(routes: &RouteComparison) -> String {
    let mut table = format!("{:<26} {:<28} {:<12}\n", "Route", "Duration", "Distance");
    for route in [&routes.fastest, &routes.alternative] {
        let metrics = RouteMetrics::extract(&route.geojson).with_traffic(&route.traffic);
        table.push_str(&format!(
            "{:<26} {:<28} {:<12}\n",
            route.label(),
            metrics.duration,
            metrics.distance
        ));
    }
    table
}

fn point_label(index: usize) -> &'static str {
    if index == 0 {
        "origin"
    } else {
        "destination"
    }
}

fn set_point(app: &mut PlannerApp) {
    if app.session.is_ready() {
        println!("Origin and destination are already set. Reset to choose new points.");
        return;
    }
    let label = point_label(app.session.points().len());
    let Some(input) = prompt(&format!("Enter {} as lng,lat: ", label)) else {
        return;
    };
    match Coordinate::parse(&input) {
        Some(point) => {
            app.session.add_point(point);
            println!("Set {} to {}", label, point);
        }
        None => println!("Invalid coordinate '{}'.", input),
    }
}

async fn search(app: &mut PlannerApp) {
    if !app.session.is_ready() {
        println!("Set an origin and a destination first.");
        return;
    }
    let now = Local::now().naive_local();
    match app
        .session
        .search_routes(app.provider.as_ref(), &app.predictor, &now)
        .await
    {
        Ok(routes) => {
            println!("Routes found.");
            print!("{}", results_table(routes));
        }
        Err(e) => eprintln!("Failed to fetch routes: {}. Try again.", e),
    }
}

async fn show_results(app: &PlannerApp) {
    let Some(routes) = app.session.routes() else {
        println!("No routes yet. Search first.");
        return;
    };
    print!("{}", results_table(routes));

    match &app.weather {
        Some(client) => {
            let (origin, destination) = tokio::join!(
                client.get_weather(&routes.origin),
                client.get_weather(&routes.destination)
            );
            println!("Weather at origin:      {}", origin);
            println!("Weather at destination: {}", destination);
        }
        None => println!(
            "{}",
            WeatherReport::Unavailable {
                message: "no weather API key configured".into()
            }
        ),
    }
}

fn choose_route(routes: &RouteComparison) -> Option<RoutePreference> {
    println!("1. {}", routes.fastest.label());
    println!("2. {}", routes.alternative.label());
    let choice = parse_route_choice(&prompt("Select route: ")?);
    if choice.is_none() {
        println!("Invalid choice.");
    }
    choice
}

fn draw_map(app: &PlannerApp) {
    let Some(routes) = app.session.routes() else {
        println!("No routes yet. Search first.");
        return;
    };
    let Some(preference) = choose_route(routes) else {
        return;
    };
    let output = app
        .output_dir
        .join(format!("route_map_{}.png", preference.as_api_str()));
    if let Err(e) = render_route_map(routes, routes.route(preference), &output) {
        eprintln!("Error rendering route map: {}", e);
    }
}

fn export(app: &PlannerApp) {
    let Some(routes) = app.session.routes() else {
        println!("No routes yet. Search first.");
        return;
    };
    let Some(preference) = choose_route(routes) else {
        return;
    };
    let today = Local::now().date_naive();
    match export_geojson(routes.route(preference), &app.output_dir, today) {
        Ok(path) => println!("GeoJSON saved to {}", path.display()),
        Err(e) => eprintln!("Error exporting GeoJSON: {}", e),
    }
    match export_points_csv(routes, &app.output_dir) {
        Ok(path) => println!("Points saved to {}", path.display()),
        Err(e) => eprintln!("Error exporting points: {}", e),
    }
}

pub async fn run_cli(app: &mut PlannerApp) {
    loop {
        println!("\nSmart Route Planner");
        println!("Points set: {}/2", app.session.points().len());
        println!("1. Set origin / destination");
        println!("2. Search routes");
        println!("3. Show results and weather");
        println!("4. Draw route map");
        println!("5. Export route");
        println!("6. Reset");
        println!("7. Exit");
        let Some(input) = prompt("Enter your choice: ") else {
            break;
        };
        match input.parse::<u32>().unwrap_or(0) {
            1 => set_point(app),
            2 => search(app).await,
            3 => show_results(app).await,
            4 => draw_map(app),
            5 => export(app),
            6 => {
                app.session.reset();
                println!("Session reset.");
            }
            7 => {
                println!("Exiting.");
                break;
            }
            _ => println!("Invalid choice. Try again."),
        }
    }
}
