use std::cmp::Ordering;
use std::env;
use std::process::Command;

// CPU features with a dedicated vector kernel
// (SSE2 is part of the x86_64 baseline and needs no detection)
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    // Flags naming the feature in /proc/cpuinfo
    cpuinfo_flags: &'static [&'static str],
    sysctl_key: &'static str,
    cfg_flag: &'static str,
    detected: bool,
}

impl CpuFeature {
    // Lowest number == highest priority
    fn priority(&self) -> usize {
        match self.name {
            "avx2" => 0,
            "neon" => 1,
            _ => usize::MAX,
        }
    }

    fn features() -> Vec<CpuFeature> {
        vec![
            CpuFeature {
                name: "avx2",
                cpuinfo_flags: &["avx2"],
                sysctl_key: "hw.optional.avx2_0: 1",
                cfg_flag: "avx2",
                detected: false,
            },
            CpuFeature {
                name: "neon",
                // aarch64 Linux reports NEON as "asimd"
                cpuinfo_flags: &["neon", "asimd"],
                sysctl_key: "hw.optional.neon: 1",
                cfg_flag: "neon",
                detected: false,
            },
        ]
    }
}

impl Ord for CpuFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for CpuFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            // Compare whole flags, not substrings of the line
            let flags: Vec<String> = cpuinfo
                .lines()
                .filter(|line| line.starts_with("flags") || line.starts_with("Features"))
                .flat_map(|line| line.split_whitespace())
                .map(str::to_lowercase)
                .collect();

            for feature in features.iter_mut() {
                feature.detected = feature
                    .cpuinfo_flags
                    .iter()
                    .any(|name| flags.iter().any(|flag| flag == name));
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(output) = Command::new("sysctl").args(["-a"]).output() {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                feature.detected = contents.contains(feature.sysctl_key);
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

// TODO: Windows detector (needs a Windows machine to check the wmic/registry output)

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn detect_cpu_features(features: &mut [CpuFeature]) {
        for detector in Self::cpu_features_detectors() {
            if detector.is_applicable() {
                detector.detect_features(features);
                break;
            }
        }
    }

    fn apply(features: &mut [CpuFeature]) {
        features.sort();

        // Highest priority detected feature wins, scalar fallback otherwise
        let cfg_flag = features
            .iter()
            .find(|cpu_feature| cpu_feature.detected)
            .map(|cpu_feature| cpu_feature.cfg_flag)
            .unwrap_or("fallback");

        println!("cargo:rustc-cfg={cfg_flag}");

        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut features = CpuFeature::features();

    // Only probe the host CPU when it is also the target
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();

    if host == target {
        PlatformDetector::detect_cpu_features(&mut features);
    }

    PlatformDetector::apply(&mut features);
}
