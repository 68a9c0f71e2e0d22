use super::{MaterialElements, MaterialSelection};
use crate::{ComponentType, Material, MaterialComponent, MaterialList};
use lume_core::scene::{MaterialChannel, ShadingModel, SurfaceMaterial};
use lume_core::{LumeError, LumeResult, Scene};

fn fill_component(
    component: &mut MaterialComponent,
    channel: &MaterialChannel,
    factor: f32,
    list: &mut MaterialList,
) -> LumeResult<()> {
    component.value = channel.color;
    component.factor = factor;
    if let Some(texture) = &channel.texture {
        component.input = list.push_filepath(texture)?;
    }
    Ok(())
}

/// Converts one surface, appending its texture paths to `list.filepaths`.
///
/// Only Lambert-family surfaces are accepted. Specular is read only when the
/// surface is also Phong; otherwise it keeps its empty default.
pub fn convert_material(
    surface: &SurfaceMaterial,
    elements: MaterialElements,
    list: &mut MaterialList,
) -> LumeResult<Material> {
    let lambert = match &surface.shading {
        ShadingModel::Lambert(lambert) | ShadingModel::Phong(lambert, _) => lambert,
        ShadingModel::Other(model) => {
            return Err(LumeError::UnsupportedShadingModel(format!(
                "material {:?} uses {:?}",
                surface.name, model
            )));
        }
    };

    let mut material = Material::default();

    if elements.contains(MaterialElements::DIFFUSE) {
        let channel = &lambert.diffuse;
        fill_component(&mut material[ComponentType::Diffuse], channel, channel.factor, list)?;
    }
    if elements.contains(MaterialElements::EMISSIVE) {
        let channel = &lambert.emissive;
        fill_component(&mut material[ComponentType::Emissive], channel, channel.factor, list)?;
    }
    if elements.contains(MaterialElements::SPECULAR) {
        if let Some(phong) = surface.shading.phong() {
            let channel = &phong.specular;
            fill_component(&mut material[ComponentType::Specular], channel, channel.factor, list)?;
        }
    }
    if elements.contains(MaterialElements::NORMAL_MAP) {
        fill_component(&mut material[ComponentType::NormalMap], &lambert.normal_map, 1.0, list)?;
    }

    Ok(material)
}

pub fn extract_materials<S: Scene + ?Sized>(
    scene: &S,
    selection: MaterialSelection,
    elements: MaterialElements,
) -> LumeResult<MaterialList> {
    let surfaces = scene.materials();
    if surfaces.is_empty() {
        return Err(LumeError::NotFound("material".into()));
    }

    let selected: &[SurfaceMaterial] = match selection {
        MaterialSelection::All => surfaces,
        MaterialSelection::Index(i) => surfaces.get(i..=i).ok_or_else(|| {
            LumeError::NotFound(format!("material {} of {}", i, surfaces.len()))
        })?,
    };

    let mut list = MaterialList::default();
    for surface in selected {
        let material = convert_material(surface, elements, &mut list)?;
        list.materials.push(material);
    }

    log::info!(
        "Materials: {} exported, {} texture paths",
        list.materials.len(),
        list.filepaths.len()
    );
    for path in &list.filepaths {
        log::debug!("  texture {:?}", path);
    }

    Ok(list)
}
