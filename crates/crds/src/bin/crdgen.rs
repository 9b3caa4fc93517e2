//! Prints the WarmImage CRD manifest as YAML.

use crds::WarmImage;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crd = WarmImage::crd();
    print!("{}", serde_yaml::to_string(&crd)?);
    Ok(())
}
