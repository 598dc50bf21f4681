use log::error;
use smart_intersection::enforcement::challan_ledger::PaymentError;
use smart_intersection::simulation_engine::simulation::{
    collect_frame_snapshot, run_simulation, SimulationContext,
};
use std::io::{stdin, stdout, Write};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const ANALYTICS_FILE: &str = "analytics.csv";

#[tokio::main]
async fn main() {
    env_logger::init();

    let ctx = Arc::new(SimulationContext::new());
    let sim_task = tokio::spawn(run_simulation(Arc::clone(&ctx)));

    run_cli(&ctx).await;

    // Exit was chosen: signal every task, wait for them, persist counters.
    ctx.shutdown.store(true, Ordering::Relaxed);
    let _ = sim_task.await;
    match ctx.analytics.save_summary(Path::new(ANALYTICS_FILE)) {
        Ok(()) => println!("Analytics saved to {ANALYTICS_FILE}"),
        Err(e) => error!("failed to save analytics summary: {e}"),
    }
}

async fn run_cli(ctx: &SimulationContext) {
    loop {
        println!("\nSmart Traffic Intersection");
        println!("1. Show intersection snapshot");
        println!("2. Pause/resume simulation");
        println!("3. Challan payment portal");
        println!("4. Show analytics");
        println!("5. Exit and save analytics");
        print!("Enter your choice: ");
        stdout().flush().unwrap();

        let mut input = String::new();
        stdin().read_line(&mut input).unwrap();
        match input.trim().parse::<u32>().unwrap_or(0) {
            1 => {
                let snapshot = collect_frame_snapshot(ctx);
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Error serializing snapshot: {e}"),
                }
            }
            2 => {
                let paused = !ctx.paused.load(Ordering::Relaxed);
                ctx.paused.store(paused, Ordering::Relaxed);
                println!("Simulation {}", if paused { "paused" } else { "resumed" });
            }
            3 => user_portal(ctx),
            4 => show_analytics(ctx),
            5 => {
                println!("Shutting down...");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn show_analytics(ctx: &SimulationContext) {
    let snapshot = ctx.analytics.snapshot();
    println!("Traffic Simulation Analytics");
    println!("-----------------------------");
    println!("total_vehicles: {}", snapshot.total_vehicles);
    println!("emergency_vehicles: {}", snapshot.emergency_vehicles);
    println!("challans_issued: {}", snapshot.challans_issued);
    println!("total_fine_amount: {}", snapshot.total_fine_amount);
    println!("breakdowns: {}", snapshot.breakdowns);
}

fn user_portal(ctx: &SimulationContext) {
    print!("Enter vehicle number (e.g. VEH0042): ");
    stdout().flush().unwrap();
    let mut input = String::new();
    stdin().read_line(&mut input).unwrap();
    let entered = input.trim();

    let Some(vehicle_id) = parse_vehicle_number(entered) else {
        println!("Unrecognized vehicle number: {entered}");
        return;
    };
    let Some(challan) = ctx.challans.find_by_vehicle(vehicle_id) else {
        println!("No challans found for vehicle {entered}");
        return;
    };

    println!("Challan details for vehicle {entered}");
    println!("Challan ID: {}", challan.challan_id);
    println!("Fine amount: ${:.2}", challan.amount);
    println!("Issued at: {} (due {})", challan.issued_at, challan.due_at);
    println!(
        "Payment status: {}",
        if challan.paid { "Paid" } else { "Unpaid" }
    );
    if challan.paid {
        return;
    }

    print!("Do you want to pay this challan? (y/n): ");
    stdout().flush().unwrap();
    let mut choice = String::new();
    stdin().read_line(&mut choice).unwrap();
    if !matches!(choice.trim(), "y" | "Y") {
        return;
    }

    print!("Enter amount to pay: ");
    stdout().flush().unwrap();
    let mut amount_input = String::new();
    stdin().read_line(&mut amount_input).unwrap();
    let amount = amount_input.trim().parse::<f64>().unwrap_or(0.0);

    match ctx.challans.pay(&challan.challan_id, amount) {
        Ok(_) => println!("Payment successful for challan {}", challan.challan_id),
        Err(PaymentError::Insufficient { required, .. }) => {
            println!("Insufficient payment. The fine is ${required:.2}; please try again.")
        }
        Err(PaymentError::NotFound(id)) => println!("Challan {id} no longer exists"),
    }
}

/// Accepts either the display form ("VEH0042") or the bare numeric id.
fn parse_vehicle_number(input: &str) -> Option<u64> {
    input.trim_start_matches("VEH").parse().ok()
}
