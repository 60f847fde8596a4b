use colored::*;
use xferprobe::{CheckOutcome, CheckReport, Diagnosis};

pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
    println!("{}", "═".repeat(60).cyan());
}

pub fn print_outcome(outcome: &CheckOutcome) {
    let marker = if outcome.passed {
        "✓".green()
    } else {
        "✗".red()
    };
    println!("  {} {}: {}", marker, outcome.name.bold(), outcome.summary);
    for line in &outcome.details {
        println!("      {line}");
    }
}

pub fn print_summary(report: &CheckReport) {
    println!();
    println!("{}", "📊 Probe Summary".bold().green());
    println!("{}", "─".repeat(60));

    for (name, passed) in &report.details {
        if *passed {
            println!("  {} {}", "✅".green(), name.bold());
        } else {
            println!("  {} {}", "❌".red(), name.bold());
        }
    }

    println!("{}", "─".repeat(60));
    println!(
        "  {}/{} passed ({:.1}%)",
        report.passed_tests, report.total_tests, report.success_rate
    );
    println!();
    if report.all_passed() {
        println!("{}", "🎉 All checks passed".bold().green());
    } else {
        println!(
            "{}",
            "⚠️  Some checks failed. See above for details.".yellow()
        );
    }
}

pub fn print_diagnosis(diagnosis: &Diagnosis) {
    println!();
    println!("{}", "═".repeat(60));

    let kind = diagnosis.kind.key();
    if diagnosis.is_known() {
        println!("{} {}", "🩺 DIAGNOSIS:".green().bold(), kind.bold());
    } else {
        println!("{} {}", "❓ DIAGNOSIS:".yellow().bold(), kind.bold());
    }
    println!("   • Confidence: {:?}", diagnosis.confidence);
    println!("   • {}", diagnosis.remedy.description);

    if !diagnosis.matched.is_empty() {
        println!("{}", "─".repeat(60));
        println!("🔎 Matched:");
        for phrase in &diagnosis.matched {
            println!("   \"{phrase}\"");
        }
    }

    println!("{}", "─".repeat(60));
    println!("📋 Likely causes:");
    for cause in diagnosis.remedy.causes {
        println!("   • {cause}");
    }

    println!("{}", "─".repeat(60));
    println!("{} {}", "🔧 Fix:".cyan(), diagnosis.remedy.fix_strategy);
    println!("{}", "═".repeat(60));
    println!();
}
