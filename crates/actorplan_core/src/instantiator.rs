//! Actor import driver.
//!
//! [`ActorImporter`] resolves a top-level actor and, recursively, its props.
//! Each invocation runs the whole pipeline for one descriptor:
//!
//! 1. select and merge one variant per group
//! 2. assemble and bind the variant geometry
//! 3. load textures and build/assign the material
//! 4. collect anchors and the root object, then recurse into props
//!
//! Attachment state flows down as an [`AttachmentContext`] value; what an
//! invocation produced flows back up as an [`ActorInstance`]. Descriptor,
//! image and material caches are created per top-level import and dropped
//! with it.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assembler::SceneAssembler;
use crate::descriptor::{
    bundle_root, normalize_path, ActorDescriptor, DescriptorStore, MeshSpec, PropRef, TextureRef,
    DEFAULT_MATERIAL,
};
use crate::error::{Diagnostic, ResolveError, ResolveResult};
use crate::host::Host;
use crate::material::{MaterialResolver, DECAL_MATERIAL};
use crate::options::ImportOptions;
use crate::report::{ActorInstance, ImportReport};
use crate::scene::{Anchor, AttachmentContext, SceneNode, PROP_MARKER};
use crate::texture::ImageCache;
use crate::variant::{select_variant, VariantResolver};

/// Material kinds containing this switch to [`DECAL_MATERIAL`] for decals.
const TERRAIN_MARKER: &str = "terrain";

/// Imports actors into a host.
pub struct ActorImporter<'h, H: Host + ?Sized> {
    host: &'h mut H,
    options: ImportOptions,
}

impl<'h, H: Host + ?Sized> ActorImporter<'h, H> {
    pub fn new(host: &'h mut H, options: ImportOptions) -> Self {
        Self { host, options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import the actor at `path` with all its props.
    ///
    /// Errors loading or resolving the top-level actor are returned. Errors
    /// inside a prop subtree skip that subtree and are reported as
    /// diagnostics.
    pub fn import(&mut self, path: &Path) -> ResolveResult<ImportReport> {
        let mut run = ImportRun::new(&mut *self.host, &self.options, bundle_root(path));
        log::info!("Importing {} from bundle {}", path.display(), run.store.root().display());

        let actor_path = normalize_path(path);
        let descriptor = run.store.load_actor_file(&actor_path)?;
        let root = run.resolve(&actor_path, &descriptor, &AttachmentContext::top_level())?;

        log::info!(
            "Imported {} actor(s), {} material(s), {} diagnostic(s)",
            root.iter().count(),
            run.materials.built().len(),
            run.diagnostics.len()
        );

        Ok(ImportReport {
            bundle_root: run.store.root().to_path_buf(),
            root,
            materials: run.materials.built().to_vec(),
            diagnostics: run.diagnostics,
        })
    }
}

/// State shared by every invocation of one top-level import.
struct ImportRun<'a, H: Host + ?Sized> {
    host: &'a mut H,
    options: &'a ImportOptions,
    store: DescriptorStore,
    materials: MaterialResolver,
    images: ImageCache,
    rng: StdRng,
    diagnostics: Vec<Diagnostic>,
    /// Actors currently being resolved, outermost first
    actors: Vec<PathBuf>,
}

impl<'a, H: Host + ?Sized> ImportRun<'a, H> {
    fn new(host: &'a mut H, options: &'a ImportOptions, root: PathBuf) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            host,
            options,
            store: DescriptorStore::new(root),
            materials: MaterialResolver::new(),
            images: ImageCache::new(),
            rng,
            diagnostics: Vec::new(),
            actors: Vec::new(),
        }
    }

    /// Resolve one descriptor and its props.
    fn resolve(
        &mut self,
        actor_path: &Path,
        descriptor: &ActorDescriptor,
        ctx: &AttachmentContext,
    ) -> ResolveResult<ActorInstance> {
        self.actors.push(actor_path.to_path_buf());
        let instance = self.resolve_actor(actor_path, descriptor, ctx);
        self.actors.pop();
        instance
    }

    fn resolve_actor(
        &mut self,
        actor_path: &Path,
        descriptor: &ActorDescriptor,
        ctx: &AttachmentContext,
    ) -> ResolveResult<ActorInstance> {
        log::debug!("Resolving {} (depth {})", actor_path.display(), ctx.depth);

        let mut kind = descriptor.material_kind().to_string();
        let mut variants = Vec::new();
        let mut nodes: Vec<SceneNode> = Vec::new();
        let mut bindings = Vec::new();
        let mut textures: Vec<TextureRef> = Vec::new();
        let mut props: Vec<PropRef> = Vec::new();
        let gather_props = self.options.allows_depth(ctx.depth);

        for group in &descriptor.groups {
            let Some(selected) = select_variant(group, &mut self.rng) else {
                continue;
            };
            log::debug!("Selected variant {}", selected.label());

            let merged = VariantResolver::new(&mut self.store).resolve(selected)?;

            if let Some(mesh) = &merged.mesh {
                if matches!(mesh, MeshSpec::Decal(_))
                    && (kind == DEFAULT_MATERIAL || kind.contains(TERRAIN_MARKER))
                {
                    kind = DECAL_MATERIAL.to_string();
                }

                let assembly = SceneAssembler::new(&mut *self.host, &self.store, &self.materials)
                    .assemble(mesh, ctx, &mut self.diagnostics)?;
                nodes.extend(assembly.nodes);
                bindings.extend(assembly.bindings);
            }

            if self.options.import_textures {
                textures.extend_from_slice(merged.textures());
            }
            if gather_props {
                props.extend_from_slice(merged.props());
            }
            variants.push(merged);
        }

        let material = if textures.is_empty() {
            None
        } else {
            self.apply_material(&kind, &textures, &nodes)?
        };

        let anchors: Vec<Anchor> = nodes.iter().flat_map(SceneNode::anchors).collect();
        let local_root = nodes
            .iter()
            .rev()
            .find(|n| n.is_root_candidate())
            .map(|n| Anchor::Node(n.node_ref()));

        let children = self.resolve_props(&props, &anchors, local_root.clone(), ctx);

        Ok(ActorInstance {
            actor: actor_path.to_path_buf(),
            attachpoint: ctx.attachpoint.clone(),
            depth: ctx.depth,
            variants,
            nodes,
            bindings,
            material,
            anchors,
            root: local_root,
            children,
        })
    }

    /// Load textures, then build the material and assign it to every node
    /// that receives one.
    fn apply_material(
        &mut self,
        kind: &str,
        textures: &[TextureRef],
        nodes: &[SceneNode],
    ) -> ResolveResult<Option<String>> {
        for texture in textures {
            let path = self.store.texture_path(&texture.file);
            log::debug!("Loading {}: {}", texture.name, path.display());

            if let Err(err) = self.images.load(&path) {
                log::warn!("Skipping texture {}: {}", texture.name, err);
                self.diagnostics.push(Diagnostic::TextureSkipped {
                    path,
                    reason: err.to_string(),
                });
            }
        }

        let Some(material) = self
            .materials
            .resolve(&mut *self.host, &self.images, kind, textures)?
        else {
            return Ok(None);
        };

        for node in nodes.iter().filter(|n| n.receives_material()) {
            self.host.assign_material(node.handle, material.handle)?;
        }

        Ok(Some(material.name))
    }

    /// Resolve each prop in order. A failing prop is skipped with a
    /// diagnostic and its siblings continue.
    fn resolve_props(
        &mut self,
        props: &[PropRef],
        anchors: &[Anchor],
        mut root: Option<Anchor>,
        ctx: &AttachmentContext,
    ) -> Vec<ActorInstance> {
        let candidates = if anchors.is_empty() {
            ctx.candidates.clone()
        } else {
            anchors.to_vec()
        };

        let mut children = Vec::new();
        for prop in props {
            if prop.actor.is_empty() {
                log::debug!("Prop at {} has no actor, skipping", prop.attachpoint);
                continue;
            }

            // A named prop point can stand in for a missing root object.
            if root.is_none() && prop.attachpoint != AttachmentContext::ROOT {
                let point = format!("{}{}", PROP_MARKER, prop.attachpoint);
                if let Some(anchor) = anchors.iter().find(|a| a.name().contains(point.as_str())) {
                    log::debug!("Using {} as root object", anchor.name());
                    root = Some(anchor.clone());
                }
            }

            let child_ctx = AttachmentContext {
                attachpoint: prop.attachpoint.clone(),
                candidates: candidates.clone(),
                root: root.clone().or_else(|| ctx.root.clone()),
                depth: ctx.depth + 1,
            };

            match self.resolve_prop(prop, &child_ctx) {
                Ok(child) => children.push(child),
                Err(err) => {
                    log::warn!("Skipping prop {} at {}: {}", prop.actor, prop.attachpoint, err);
                    self.diagnostics.push(Diagnostic::PropSkipped {
                        actor: prop.actor.clone(),
                        attachpoint: prop.attachpoint.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        children
    }

    fn resolve_prop(&mut self, prop: &PropRef, ctx: &AttachmentContext) -> ResolveResult<ActorInstance> {
        let path = self.store.actor_path(&prop.actor);
        if self.actors.contains(&path) {
            let mut chain = self.actors.clone();
            chain.push(path.clone());
            return Err(ResolveError::CyclicProp { path, chain });
        }
        log::info!("Loading prop {} at {}", path.display(), prop.attachpoint);

        let descriptor = self.store.load_actor_file(&path)?;
        self.resolve(&path, &descriptor, ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::ResolveError;
    use crate::host::NodeHandle;
    use crate::material::BlendMode;
    use crate::memory::{MemoryHost, NodeTemplate};
    use crate::scene::NodeRef;

    /// An actor bundle on disk.
    struct Bundle {
        dir: TempDir,
    }

    impl Bundle {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn png(&self, relative: &str) {
            let path = self.dir.path().join("textures/skins").join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            image::RgbaImage::new(2, 2).save(&path).unwrap();
        }

        fn actor(&self, name: &str, body: &str) -> PathBuf {
            self.write(
                &format!("actors/{name}"),
                &format!("<actor><group><variant>{body}</variant></group></actor>"),
            )
        }
    }

    fn options() -> ImportOptions {
        ImportOptions {
            seed: Some(3),
            ..Default::default()
        }
    }

    fn node_anchor(host: &MemoryHost, name: &str) -> Anchor {
        let node = host.node_by_name(name).unwrap();
        Anchor::Node(NodeRef {
            handle: node.handle,
            name: node.name.clone(),
        })
    }

    /// Three actors, each attaching the next at its root.
    fn chain(bundle: &Bundle) -> PathBuf {
        bundle.actor("c.xml", "<mesh>c.dae</mesh>");
        bundle.actor("b.xml", r#"<mesh>b.dae</mesh><props><prop attachpoint="root" actor="c.xml"/></props>"#);
        bundle.actor("a.xml", r#"<mesh>a.dae</mesh><props><prop attachpoint="root" actor="b.xml"/></props>"#)
    }

    #[test]
    fn test_end_to_end() {
        let bundle = Bundle::new();
        bundle.png("horse/horse_a.png");
        bundle.png("horse/horse_norm.png");
        bundle.actor("props/saddle.xml", "<mesh>props/saddle.dae</mesh>");
        let horse = bundle.write(
            "actors/units/horse.xml",
            r#"<actor version="1">
  <group>
    <variant name="Base">
      <mesh>skeletal/horse.dae</mesh>
      <textures>
        <texture name="baseTex" file="horse/horse_a.png"/>
        <texture name="normTex" file="horse/horse_norm.png"/>
      </textures>
      <props>
        <prop attachpoint="root" actor="props/saddle.xml"/>
      </props>
    </variant>
  </group>
  <material>player_trans.xml</material>
</actor>"#,
        );

        let mut host = MemoryHost::new();
        host.register_mesh("skeletal/horse.dae", vec![NodeTemplate::mesh("horse")]);
        host.register_mesh("props/saddle.dae", vec![NodeTemplate::mesh("saddle")]);

        let report = ActorImporter::new(&mut host, options()).import(&horse).unwrap();

        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.materials, vec!["horse_a.png"]);
        assert_eq!(host.built_materials(), vec!["horse_a.png"]);

        let imports = host.imports();
        assert_eq!(imports.len(), 2);
        assert!(imports[0].ends_with("meshes/skeletal/horse.dae"));
        assert!(imports[1].ends_with("meshes/props/saddle.dae"));

        // The prop follows the parent's root object
        let root = node_anchor(&host, "horse");
        assert_eq!(report.root.root, Some(root.clone()));
        assert_eq!(host.node_by_name("saddle").unwrap().constraints, vec![root]);
        assert!(host.node_by_name("horse").unwrap().constraints.is_empty());

        // Only the top actor has textures
        let material = host.material_by_name("horse_a.png").unwrap();
        assert_eq!(host.node_by_name("horse").unwrap().material_slots, vec![material.handle]);
        assert!(host.node_by_name("saddle").unwrap().material_slots.is_empty());
        let spec = material.spec.as_ref().unwrap();
        assert!(spec.player_tint.is_some());
        assert!(spec.normal.as_ref().unwrap().invert_green);

        assert_eq!(report.root.material.as_deref(), Some("horse_a.png"));
        assert_eq!(report.root.children.len(), 1);
        assert_eq!(report.root.children[0].depth, 1);
        assert!(report.root.children[0].material.is_none());
    }

    #[test]
    fn test_depth_limit() {
        let bundle = Bundle::new();
        let top = chain(&bundle);

        let mut host = MemoryHost::permissive();
        let limited = ImportOptions {
            import_depth: 1,
            ..options()
        };
        let report = ActorImporter::new(&mut host, limited).import(&top).unwrap();

        // The top actor's props resolve, theirs do not
        assert_eq!(host.imports().len(), 2);
        assert_eq!(report.root.children.len(), 1);
        assert!(report.root.children[0].children.is_empty());
        assert_eq!(report.root.prop_levels(), 1);

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();
        assert_eq!(host.imports().len(), 3);
        assert_eq!(report.root.prop_levels(), 2);

        // Each level follows the root object of the level above
        assert_eq!(host.node_by_name("c").unwrap().constraints, vec![node_anchor(&host, "b")]);
    }

    #[test]
    fn test_props_disabled() {
        let bundle = Bundle::new();
        let top = chain(&bundle);

        for disabled in [
            ImportOptions {
                import_props: false,
                ..options()
            },
            ImportOptions {
                import_depth: 0,
                ..options()
            },
        ] {
            let mut host = MemoryHost::permissive();
            let report = ActorImporter::new(&mut host, disabled).import(&top).unwrap();
            assert_eq!(host.imports().len(), 1);
            assert!(report.root.children.is_empty());
        }
    }

    #[test]
    fn test_failing_prop_skipped() {
        let bundle = Bundle::new();
        bundle.actor("b.xml", "<mesh>b.dae</mesh>");
        bundle.actor("broken.xml", "<mesh>");
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><props>
                <prop attachpoint="head" actor="missing.xml"/>
                <prop attachpoint="tail" actor="broken.xml"/>
                <prop attachpoint="back" actor=""/>
                <prop attachpoint="root" actor="b.xml"/>
            </props>"#,
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        // Siblings of a failing prop still resolve
        assert_eq!(report.root.children.len(), 1);
        assert!(report.root.children[0].actor.ends_with("actors/b.xml"));

        let skipped: Vec<_> = report
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::PropSkipped { actor, .. } => Some(actor.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec!["missing.xml", "broken.xml"]);
    }

    #[test]
    fn test_top_level_errors_propagate() {
        let bundle = Bundle::new();
        let mut host = MemoryHost::permissive();
        let mut importer = ActorImporter::new(&mut host, options());

        let missing = bundle.dir.path().join("actors/none.xml");
        assert!(matches!(importer.import(&missing), Err(ResolveError::NotFound { .. })));

        bundle.write("variants/v1.xml", r#"<variant file="v2.xml"/>"#);
        bundle.write("variants/v2.xml", r#"<variant file="v1.xml"/>"#);
        let cyclic = bundle.write(
            "actors/cyclic.xml",
            r#"<actor><group><variant file="v1.xml"/></group></actor>"#,
        );
        assert!(matches!(
            importer.import(&cyclic),
            Err(ResolveError::CyclicInheritance { .. })
        ));
    }

    #[test]
    fn test_cyclic_variant_in_prop_skipped() {
        let bundle = Bundle::new();
        bundle.write("variants/v1.xml", r#"<variant file="v1.xml"/>"#);
        bundle.write(
            "actors/cyclic.xml",
            r#"<actor><group><variant file="v1.xml"/></group></actor>"#,
        );
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><props><prop attachpoint="root" actor="cyclic.xml"/></props>"#,
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        assert!(report.root.children.is_empty());
        match &report.diagnostics[..] {
            [Diagnostic::PropSkipped { reason, .. }] => assert!(reason.contains("cyclic")),
            other => panic!("unexpected diagnostics {:?}", other),
        }
    }

    #[test]
    fn test_self_referencing_prop_skipped() {
        let bundle = Bundle::new();
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><props><prop attachpoint="root" actor="a.xml"/></props>"#,
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, ImportOptions::default()).import(&top).unwrap();

        assert_eq!(host.imports().len(), 1);
        assert!(report.root.children.is_empty());
        match &report.diagnostics[..] {
            [Diagnostic::PropSkipped { actor, reason, .. }] => {
                assert_eq!(actor, "a.xml");
                assert!(reason.contains("cyclic prop reference"));
            }
            other => panic!("unexpected diagnostics {:?}", other),
        }
    }

    #[test]
    fn test_indirect_prop_cycle_skipped() {
        let bundle = Bundle::new();
        bundle.actor(
            "b.xml",
            r#"<mesh>b.dae</mesh><props>
                <prop attachpoint="root" actor="a.xml"/>
                <prop attachpoint="root" actor="c.xml"/>
            </props>"#,
        );
        bundle.actor("c.xml", "<mesh>c.dae</mesh>");
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><props><prop attachpoint="root" actor="b.xml"/></props>"#,
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, ImportOptions::default()).import(&top).unwrap();

        // Only the prop closing the loop is skipped; its sibling resolves
        assert_eq!(host.imports().len(), 3);
        let b = &report.root.children[0];
        assert_eq!(b.children.len(), 1);
        assert!(b.children[0].actor.ends_with("actors/c.xml"));
        assert!(matches!(
            &report.diagnostics[..],
            [Diagnostic::PropSkipped { actor, .. }] if actor == "a.xml"
        ));

        // The same actor may appear twice as long as it is not its own ancestor
        let mut host = MemoryHost::permissive();
        let twice = bundle.actor(
            "pair.xml",
            r#"<mesh>pair.dae</mesh><props>
                <prop attachpoint="root" actor="c.xml"/>
                <prop attachpoint="root" actor="c.xml"/>
            </props>"#,
        );
        let report = ActorImporter::new(&mut host, options()).import(&twice).unwrap();
        assert_eq!(report.root.children.len(), 2);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_material_shared_between_props() {
        let bundle = Bundle::new();
        bundle.png("shared.png");
        let textures = r#"<textures><texture name="baseTex" file="shared.png"/></textures>"#;
        bundle.actor("b.xml", &format!("<mesh>b.dae</mesh>{textures}"));
        let top = bundle.actor(
            "a.xml",
            &format!(r#"<mesh>a.dae</mesh>{textures}<props><prop attachpoint="root" actor="b.xml"/></props>"#),
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        assert_eq!(host.built_materials(), vec!["shared.png"]);
        assert_eq!(report.materials, vec!["shared.png"]);
        assert_eq!(
            host.node_by_name("a").unwrap().material_slots,
            host.node_by_name("b").unwrap().material_slots
        );
    }

    #[test]
    fn test_caches_are_run_scoped() {
        let bundle = Bundle::new();
        bundle.png("a.png");
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><textures><texture name="baseTex" file="a.png"/></textures>"#,
        );

        let mut host = MemoryHost::permissive();
        let mut importer = ActorImporter::new(&mut host, options());
        let first = importer.import(&top).unwrap();
        let second = importer.import(&top).unwrap();

        // Each run builds its own material
        assert_eq!(first.materials, second.materials);
        assert_eq!(host.built_materials(), vec!["a.png", "a.png"]);
    }

    #[test]
    fn test_bone_anchor() {
        let bundle = Bundle::new();
        bundle.actor("rider.xml", "<mesh>rider.dae</mesh>");
        let top = bundle.actor(
            "horse.xml",
            r#"<mesh>horse.dae</mesh><props><prop attachpoint="rider" actor="rider.xml"/></props>"#,
        );

        let mut host = MemoryHost::new();
        host.register_mesh(
            "horse.dae",
            vec![
                NodeTemplate::mesh("horse"),
                NodeTemplate::armature("Armature", &["spine", "prop.rider"]),
            ],
        );
        host.register_mesh("rider.dae", vec![NodeTemplate::mesh("rider")]);

        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        let armature = host.node_by_name("Armature").unwrap();
        let bone = Anchor::Bone {
            armature: NodeRef {
                handle: armature.handle,
                name: "Armature".into(),
            },
            bone: "prop_rider".into(),
        };
        assert_eq!(report.root.anchors, vec![bone.clone()]);
        assert_eq!(host.node_by_name("rider").unwrap().constraints, vec![bone]);
    }

    #[test]
    fn test_material_skips_anchors_and_helpers() {
        let bundle = Bundle::new();
        bundle.png("horse_a.png");
        let top = bundle.actor(
            "horse.xml",
            r#"<mesh>horse.dae</mesh>
            <textures><texture name="baseTex" file="horse_a.png"/></textures>"#,
        );

        let mut host = MemoryHost::new();
        host.register_mesh(
            "horse.dae",
            vec![
                NodeTemplate::mesh("horse"),
                NodeTemplate::mesh("prop.flag"),
                NodeTemplate::empty("prop.saddle"),
                NodeTemplate::armature("Armature", &["spine", "prop.rider"]),
                NodeTemplate::empty("Helper"),
            ],
        );

        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();
        assert_eq!(report.root.material.as_deref(), Some("horse_a.png"));

        let material = host.material_by_name("horse_a.png").unwrap().handle;
        assert_eq!(host.node_by_name("horse").unwrap().material_slots, vec![material]);
        for name in ["prop_flag", "prop_saddle", "Armature", "Helper"] {
            assert!(
                host.node_by_name(name).unwrap().material_slots.is_empty(),
                "{name} received a material"
            );
        }
    }

    #[test]
    fn test_named_prop_point_becomes_root() {
        let bundle = Bundle::new();
        bundle.actor("turret.xml", "<mesh>turret.dae</mesh>");
        bundle.actor("flag.xml", "<mesh>flag.dae</mesh>");
        let top = bundle.actor(
            "tower.xml",
            r#"<mesh>tower.dae</mesh><props>
                <prop attachpoint="turret" actor="turret.xml"/>
                <prop attachpoint="root" actor="flag.xml"/>
            </props>"#,
        );

        let mut host = MemoryHost::new();
        host.register_mesh("tower.dae", vec![NodeTemplate::empty("prop-turret")]);
        host.register_mesh("turret.dae", vec![NodeTemplate::mesh("turret")]);
        host.register_mesh("flag.dae", vec![NodeTemplate::mesh("flag")]);

        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        let point = node_anchor(&host, "prop_turret");
        assert_eq!(report.root.root, None);
        assert_eq!(host.node_by_name("turret").unwrap().constraints, vec![point.clone()]);
        // Later props follow the promoted prop point
        assert_eq!(host.node_by_name("flag").unwrap().constraints, vec![point]);
    }

    #[test]
    fn test_unresolved_prop_attachment() {
        let bundle = Bundle::new();
        bundle.actor("tail.xml", "<mesh>tail.dae</mesh>");
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><props><prop attachpoint="tail" actor="tail.xml"/></props>"#,
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        assert_eq!(report.root.children.len(), 1);
        assert!(host.node_by_name("tail").unwrap().constraints.is_empty());
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::UnresolvedAttachment {
                node: "tail".into(),
                attachpoint: "tail".into(),
                root: Some("a".into()),
            }]
        );
    }

    #[test]
    fn test_decal_material() {
        let bundle = Bundle::new();
        bundle.png("decal.png");
        let top = bundle.actor(
            "decal.xml",
            r#"<decal width="2" depth="2" angle="0" offsetx="0" offsetz="0"/>
               <textures><texture name="baseTex" file="decal.png"/></textures>"#,
        );

        let mut host = MemoryHost::new();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        assert_eq!(report.root.material.as_deref(), Some("decal.png"));
        let spec = host.material_by_name("decal.png").unwrap().spec.clone().unwrap();
        assert_eq!(spec.blend, BlendMode::AlphaClip);
        assert!(host.imports().is_empty());
    }

    #[test]
    fn test_missing_texture_skipped() {
        let bundle = Bundle::new();
        bundle.png("a_norm.png");
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><textures>
                <texture name="baseTex" file="a.png"/>
                <texture name="normTex" file="a_norm.png"/>
            </textures>"#,
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        assert!(matches!(&report.diagnostics[..], [Diagnostic::TextureSkipped { .. }]));
        // The material keeps its base texture name but has no base image
        let spec = host.material_by_name("a.png").unwrap().spec.clone().unwrap();
        assert!(spec.base_color.is_none());
        assert!(spec.normal.is_some());
    }

    #[test]
    fn test_textures_disabled() {
        let bundle = Bundle::new();
        bundle.png("a.png");
        let top = bundle.actor(
            "a.xml",
            r#"<mesh>a.dae</mesh><textures><texture name="baseTex" file="a.png"/></textures>"#,
        );

        let mut host = MemoryHost::permissive();
        let no_textures = ImportOptions {
            import_textures: false,
            ..options()
        };
        let report = ActorImporter::new(&mut host, no_textures).import(&top).unwrap();

        assert!(report.materials.is_empty());
        assert!(report.root.material.is_none());
        assert!(host.built_materials().is_empty());
    }

    #[test]
    fn test_inherited_variant() {
        let bundle = Bundle::new();
        bundle.write(
            "variants/horse/base.xml",
            r#"<variant><mesh>horse.dae</mesh><props><prop attachpoint="root" actor="saddle.xml"/></props></variant>"#,
        );
        bundle.actor("saddle.xml", "<mesh>saddle.dae</mesh>");
        let top = bundle.write(
            "actors/horse.xml",
            r#"<actor><group><variant name="Brown" file="horse/base.xml"/></group></actor>"#,
        );

        let mut host = MemoryHost::permissive();
        let report = ActorImporter::new(&mut host, options()).import(&top).unwrap();

        assert_eq!(host.imports().len(), 2);
        assert_eq!(report.root.variants[0].name.as_deref(), Some("Brown"));
        assert_eq!(host.node_by_name("saddle").unwrap().constraints, vec![node_anchor(&host, "horse")]);
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let bundle = Bundle::new();
        let top = bundle.write(
            "actors/herd.xml",
            r#"<actor>
                <group><variant name="a"/><variant name="b"/><variant name="c"/><variant name="d"/></group>
                <group><variant name="e"/><variant name="f"/><variant name="g"/></group>
            </actor>"#,
        );

        let names = |seed: u64| {
            let mut host = MemoryHost::permissive();
            let options = ImportOptions {
                seed: Some(seed),
                ..Default::default()
            };
            let report = ActorImporter::new(&mut host, options).import(&top).unwrap();
            report
                .root
                .variants
                .iter()
                .map(|v| v.name.clone().unwrap_or_default())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(11), names(11));
        assert_eq!(names(11).len(), 2);
    }

    #[test]
    fn test_handles_are_distinct_per_import() {
        let bundle = Bundle::new();
        let top = bundle.actor("a.xml", "<mesh>a.dae</mesh>");

        let mut host = MemoryHost::permissive();
        let mut importer = ActorImporter::new(&mut host, options());
        let first = importer.import(&top).unwrap();
        let second = importer.import(&top).unwrap();

        let handle = |r: &ImportReport| -> NodeHandle { r.root.nodes[0].handle };
        assert_ne!(handle(&first), handle(&second));
        assert_eq!(second.root.nodes[0].name, "a.001");
    }
}
